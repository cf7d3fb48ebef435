//! Provisioning engine abstraction.
//!
//! An engine receives one synthesized template at a time, together with
//! the concrete values of every import the stack consumes, and returns the
//! concrete value of each declared output.

use std::collections::BTreeMap;

use serde_json::Value;
use stackweave_common::error::{Result, StackweaveError};
use stackweave_compose::descriptor::OutputRef;
use stackweave_compose::template::StackTemplate;

/// Platform that turns templates into provisioned resources.
pub trait ProvisioningEngine {
    /// Provisions `template`, returning its outputs keyed by output key.
    ///
    /// `imports` holds the resolved value of every cross-stack import.
    ///
    /// # Errors
    ///
    /// Returns [`StackweaveError::Provisioning`] if the stack cannot be
    /// provisioned.
    fn provision(
        &mut self,
        template: &StackTemplate,
        imports: &BTreeMap<OutputRef, String>,
    ) -> Result<BTreeMap<String, String>>;
}

/// In-process engine producing deterministic synthetic values.
///
/// A runtime attribute `attr` of resource `id` in stack `S` reads as
/// `S/id.attr`; a bare reference reads as `S/id`. Output expressions are
/// rendered from these values.
///
/// A secret referenced by name alone must be supplied through
/// [`DryRunEngine::with_secrets`]; a reference naming a field reads a
/// structured secret already held by the platform's secret store.
#[derive(Debug, Default)]
pub struct DryRunEngine {
    provisioned: Vec<String>,
    secrets: BTreeMap<String, String>,
}

impl DryRunEngine {
    /// Creates an engine with nothing provisioned.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine holding the deployment-supplied secret values.
    #[must_use]
    pub fn with_secrets(secrets: BTreeMap<String, String>) -> Self {
        Self {
            provisioned: Vec::new(),
            secrets,
        }
    }

    /// Names of the stacks provisioned so far, in order.
    pub fn provisioned(&self) -> &[String] {
        &self.provisioned
    }
}

impl ProvisioningEngine for DryRunEngine {
    fn provision(
        &mut self,
        template: &StackTemplate,
        imports: &BTreeMap<OutputRef, String>,
    ) -> Result<BTreeMap<String, String>> {
        let stack = template.stack.as_str();
        for resource in &template.resources {
            check_imports(stack, &resource.properties, imports)?;
            check_secrets(stack, &resource.properties, &self.secrets)?;
        }

        let mut outputs = BTreeMap::new();
        for output in &template.outputs {
            let value = render(stack, &output.value).ok_or_else(|| {
                StackweaveError::Provisioning {
                    stack: stack.to_owned(),
                    message: format!("output {} has an unsupported value", output.key),
                }
            })?;
            let _ = outputs.insert(output.key.clone(), value);
        }

        tracing::info!(stack, resources = template.resources.len(), "dry-run provisioned");
        self.provisioned.push(stack.to_owned());
        Ok(outputs)
    }
}

fn check_imports(stack: &str, value: &Value, imports: &BTreeMap<OutputRef, String>) -> Result<()> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(export)) = map.get("Fn::ImportValue") {
                let supplied = imports.keys().any(|r| r.to_string() == *export);
                if !supplied {
                    return Err(StackweaveError::Provisioning {
                        stack: stack.to_owned(),
                        message: format!("import {export} was not supplied"),
                    });
                }
            }
            map.values().try_for_each(|v| check_imports(stack, v, imports))
        }
        Value::Array(items) => items.iter().try_for_each(|v| check_imports(stack, v, imports)),
        _ => Ok(()),
    }
}

fn check_secrets(stack: &str, value: &Value, secrets: &BTreeMap<String, String>) -> Result<()> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(name)) = map.get("Secret") {
                if !map.contains_key("field") && !secrets.contains_key(name) {
                    return Err(StackweaveError::Provisioning {
                        stack: stack.to_owned(),
                        message: format!("secret {name} was not supplied"),
                    });
                }
            }
            map.values().try_for_each(|v| check_secrets(stack, v, secrets))
        }
        Value::Array(items) => items.iter().try_for_each(|v| check_secrets(stack, v, secrets)),
        _ => Ok(()),
    }
}

fn render(stack: &str, value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => {
            if let Some(Value::String(id)) = map.get("Ref") {
                return Some(format!("{stack}/{id}"));
            }
            if let Some(Value::Array(pair)) = map.get("Fn::GetAtt") {
                let [Value::String(id), Value::String(attr)] = pair.as_slice() else {
                    return None;
                };
                return Some(format!("{stack}/{id}.{attr}"));
            }
            let Some(Value::Array(join)) = map.get("Fn::Join") else {
                return None;
            };
            let [Value::String(separator), Value::Array(parts)] = join.as_slice() else {
                return None;
            };
            let rendered = parts
                .iter()
                .map(|p| render(stack, p))
                .collect::<Option<Vec<_>>>()?;
            Some(rendered.join(separator))
        }
        _ => None,
    }
}
