//! Late-bound output values keyed by `(stack, key)`.
//!
//! Every declared output starts pending. Values become readable only once
//! the producing stack is recorded as provisioned; reading earlier fails
//! with [`StackweaveError::UnresolvedReference`].

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use stackweave_common::error::{Result, StackweaveError};
use stackweave_common::types::StackName;

use crate::descriptor::OutputRef;
use crate::resolver::ResolvedApp;

/// State of one output value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum OutputState {
    /// Producing stack not provisioned yet.
    Pending,
    /// Concrete value returned by the provisioning engine.
    Resolved(String),
}

/// A resolved output, as shown to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorOutput {
    /// Producing stack.
    pub stack: StackName,
    /// Output key.
    pub key: String,
    /// Output description, if declared.
    pub description: Option<String>,
    /// Concrete value.
    pub value: String,
}

/// Registry of every declared output of a resolved application.
#[derive(Debug, Clone)]
pub struct OutputEmitter {
    values: BTreeMap<OutputRef, OutputState>,
    descriptions: BTreeMap<OutputRef, String>,
    imports: BTreeMap<StackName, Vec<OutputRef>>,
    /// Stack names in emission order.
    order: Vec<StackName>,
    provisioned: HashSet<StackName>,
}

impl OutputEmitter {
    /// Registers every declared output of `app` as pending.
    #[must_use]
    pub fn new(app: &ResolvedApp) -> Self {
        let mut values = BTreeMap::new();
        let mut descriptions = BTreeMap::new();
        let mut imports = BTreeMap::new();
        let mut order = Vec::new();

        for resolved in app.stacks() {
            let stack = &resolved.stack;
            order.push(stack.name().clone());
            for output in stack.outputs() {
                let key = OutputRef::new(stack.name().clone(), output.key.clone());
                if let Some(description) = &output.description {
                    let _ = descriptions.insert(key.clone(), description.clone());
                }
                let _ = values.insert(key, OutputState::Pending);
            }
            let _ = imports.insert(
                stack.name().clone(),
                stack.imports().into_iter().cloned().collect(),
            );
        }

        Self {
            values,
            descriptions,
            imports,
            order,
            provisioned: HashSet::new(),
        }
    }

    /// Records that `stack` was provisioned with the given output values.
    ///
    /// # Errors
    ///
    /// Returns [`StackweaveError::NotFound`] for an unknown stack and a
    /// validation error if a declared output is missing from `values`.
    pub fn record_provisioned(
        &mut self,
        stack: &StackName,
        values: &BTreeMap<String, String>,
    ) -> Result<()> {
        if !self.order.contains(stack) {
            return Err(StackweaveError::NotFound {
                kind: "stack",
                id: stack.to_string(),
            });
        }

        let declared: Vec<OutputRef> = self
            .values
            .keys()
            .filter(|r| &r.stack == stack)
            .cloned()
            .collect();
        for output in &declared {
            if !values.contains_key(&output.key) {
                return Err(StackweaveError::validation(
                    format!("provisioned outputs of stack {stack}"),
                    output.key.as_str(),
                    "was not returned by the provisioning engine",
                ));
            }
        }
        for output in declared {
            let value = values[&output.key].clone();
            tracing::debug!(output = %output, "output resolved");
            let _ = self.values.insert(output, OutputState::Resolved(value));
        }

        let _ = self.provisioned.insert(stack.clone());
        tracing::info!(%stack, "stack recorded as provisioned");
        Ok(())
    }

    /// Whether `stack` has been recorded as provisioned.
    pub fn is_provisioned(&self, stack: &StackName) -> bool {
        self.provisioned.contains(stack)
    }

    /// Returns the state of an output.
    ///
    /// # Errors
    ///
    /// Returns [`StackweaveError::NotFound`] if the output is not declared.
    pub fn state(&self, output: &OutputRef) -> Result<&OutputState> {
        self.values
            .get(output)
            .ok_or_else(|| StackweaveError::NotFound {
                kind: "output",
                id: output.to_string(),
            })
    }

    /// Reads a concrete output value.
    ///
    /// # Errors
    ///
    /// Returns [`StackweaveError::UnresolvedReference`] if the producing
    /// stack is not provisioned, or [`StackweaveError::NotFound`] if the
    /// output is not declared.
    pub fn read(&self, output: &OutputRef) -> Result<&str> {
        match self.state(output)? {
            OutputState::Resolved(value) => Ok(value),
            OutputState::Pending => Err(StackweaveError::UnresolvedReference {
                stack: output.stack.to_string(),
                key: output.key.clone(),
            }),
        }
    }

    /// Resolves every import of a consuming stack.
    ///
    /// A failure here concerns `consumer` only; other stacks stay readable.
    ///
    /// # Errors
    ///
    /// Returns the first unresolved import, or `NotFound` for an unknown
    /// consumer.
    pub fn resolve_imports(&self, consumer: &StackName) -> Result<BTreeMap<OutputRef, String>> {
        let imports = self
            .imports
            .get(consumer)
            .ok_or_else(|| StackweaveError::NotFound {
                kind: "stack",
                id: consumer.to_string(),
            })?;
        imports
            .iter()
            .map(|r| self.read(r).map(|v| (r.clone(), v.to_owned())))
            .collect()
    }

    /// Resolved outputs in stack emission order.
    pub fn operator_outputs(&self) -> Vec<OperatorOutput> {
        self.order
            .iter()
            .flat_map(|stack| {
                self.values
                    .iter()
                    .filter(move |(r, _)| &r.stack == stack)
            })
            .filter_map(|(r, state)| match state {
                OutputState::Resolved(value) => Some(OperatorOutput {
                    stack: r.stack.clone(),
                    key: r.key.clone(),
                    description: self.descriptions.get(r).cloned(),
                    value: value.clone(),
                }),
                OutputState::Pending => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use stackweave_common::types::{Environment, ResourceKind};

    use super::*;
    use crate::descriptor::ResourceDescriptor;
    use crate::group::CompositeGroup;
    use crate::resolver::resolve;
    use crate::stack::{OutputDecl, Stack};

    fn app() -> ResolvedApp {
        let env = Environment::new("123456789012", "us-east-1");
        let mut producer = Stack::new("S3BucketStack", env.clone());
        producer
            .add_group(
                CompositeGroup::new("storage").with(
                    ResourceDescriptor::builder(ResourceKind::ObjectStore, "lake")
                        .text("bucketName", "lake")
                        .build()
                        .expect("bucket"),
                ),
            )
            .expect("group");
        producer
            .add_output(
                OutputDecl::new("BucketName", "${lake}")
                    .expect("expr")
                    .describe("Data lake bucket"),
            )
            .expect("output");

        let mut consumer = Stack::new("FastApiAppStack", env);
        consumer
            .add_group(
                CompositeGroup::new("parameters").with(
                    ResourceDescriptor::builder(ResourceKind::ParameterEntry, "bucket-param")
                        .text("parameterName", "/app/BUCKET_NAME")
                        .import("value", OutputRef::new("S3BucketStack", "BucketName"))
                        .build()
                        .expect("parameter"),
                ),
            )
            .expect("group");
        consumer.add_dependency("S3BucketStack");

        resolve(&[producer, consumer]).expect("resolve")
    }

    fn bucket_output() -> OutputRef {
        OutputRef::new("S3BucketStack", "BucketName")
    }

    #[test]
    fn outputs_start_pending() {
        let emitter = OutputEmitter::new(&app());
        assert_eq!(
            emitter.state(&bucket_output()).expect("declared"),
            &OutputState::Pending
        );
    }

    #[test]
    fn reading_before_provisioning_is_unresolved() {
        let emitter = OutputEmitter::new(&app());
        let err = emitter.read(&bucket_output()).unwrap_err();
        assert!(
            matches!(err, StackweaveError::UnresolvedReference { ref stack, ref key }
                if stack == "S3BucketStack" && key == "BucketName"),
            "got: {err}"
        );
    }

    #[test]
    fn consumer_imports_fail_until_producer_is_provisioned() {
        let mut emitter = OutputEmitter::new(&app());
        let consumer = StackName::new("FastApiAppStack");
        assert!(matches!(
            emitter.resolve_imports(&consumer),
            Err(StackweaveError::UnresolvedReference { .. })
        ));

        let values = BTreeMap::from([("BucketName".to_owned(), "lake-123".to_owned())]);
        emitter
            .record_provisioned(&StackName::new("S3BucketStack"), &values)
            .expect("record");
        let imports = emitter.resolve_imports(&consumer).expect("resolved");
        assert_eq!(imports[&bucket_output()], "lake-123");
    }

    #[test]
    fn missing_declared_value_is_rejected() {
        let mut emitter = OutputEmitter::new(&app());
        let err = emitter
            .record_provisioned(&StackName::new("S3BucketStack"), &BTreeMap::new())
            .unwrap_err();
        assert!(err.to_string().contains("BucketName"), "got: {err}");
        assert!(!emitter.is_provisioned(&StackName::new("S3BucketStack")));
    }

    #[test]
    fn unknown_stack_cannot_be_recorded() {
        let mut emitter = OutputEmitter::new(&app());
        let err = emitter
            .record_provisioned(&StackName::new("Ghost"), &BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, StackweaveError::NotFound { .. }));
    }

    #[test]
    fn undeclared_output_is_not_found() {
        let emitter = OutputEmitter::new(&app());
        let err = emitter
            .read(&OutputRef::new("S3BucketStack", "BucketArn"))
            .unwrap_err();
        assert!(matches!(err, StackweaveError::NotFound { .. }));
    }

    #[test]
    fn operator_outputs_list_resolved_values_only() {
        let mut emitter = OutputEmitter::new(&app());
        assert!(emitter.operator_outputs().is_empty());
        let values = BTreeMap::from([("BucketName".to_owned(), "lake-123".to_owned())]);
        emitter
            .record_provisioned(&StackName::new("S3BucketStack"), &values)
            .expect("record");
        let outputs = emitter.operator_outputs();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].value, "lake-123");
        assert_eq!(outputs[0].description.as_deref(), Some("Data lake bucket"));
    }
}
