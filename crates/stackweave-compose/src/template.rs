//! Synthesis of resolved stacks into declarative templates.
//!
//! One template per stack, in emission order. Intra-stack references
//! become `Ref`/`Fn::GetAtt` nodes, cross-stack imports become
//! `Fn::ImportValue` nodes naming `<stack>:<key>`, and secrets are
//! emitted by name only.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Value, json};
use stackweave_common::error::{Result, StackweaveError};
use stackweave_common::types::{Environment, ResourceId, StackName};

use crate::descriptor::{ConfigValue, ResourceRef};
use crate::expr::{ExprPart, OutputExpr};
use crate::resolver::{ResolvedApp, ResolvedStack};

/// Serialization format of written templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

impl TemplateFormat {
    /// File extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Declarative form of one stack.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTemplate {
    /// Stack name.
    pub stack: StackName,
    /// Account and region.
    pub environment: Environment,
    /// Stacks that must be provisioned first.
    pub dependencies: Vec<StackName>,
    /// Resources in emission order.
    pub resources: Vec<TemplateResource>,
    /// Declared outputs.
    pub outputs: Vec<TemplateOutput>,
}

/// One resource of a [`StackTemplate`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResource {
    /// Identifier within the stack.
    pub id: ResourceId,
    /// Resource type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Composite group the resource was declared in.
    pub group: String,
    /// Configuration with references rendered as intrinsic nodes.
    pub properties: Value,
    /// Intra-stack dependencies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<ResourceId>,
}

/// One output of a [`StackTemplate`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOutput {
    /// Output key.
    pub key: String,
    /// Description, if declared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value expression.
    pub value: Value,
    /// Export name other stacks import the value by.
    pub export_name: String,
}

impl StackTemplate {
    /// Serializes the template in `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, format: TemplateFormat) -> Result<String> {
        Ok(match format {
            TemplateFormat::Json => serde_json::to_string_pretty(self)?,
            TemplateFormat::Yaml => serde_yaml::to_string(self)?,
        })
    }

    /// File name for the template at `position` (zero-based) in emission order.
    pub fn file_name(&self, position: usize, format: TemplateFormat) -> String {
        format!(
            "{:02}-{}.template.{}",
            position + 1,
            self.stack,
            format.extension()
        )
    }
}

/// Synthesizes one template per stack, in emission order.
pub fn synthesize(app: &ResolvedApp) -> Vec<StackTemplate> {
    let templates: Vec<StackTemplate> = app.stacks().iter().map(synthesize_stack).collect();
    tracing::info!(templates = templates.len(), "synthesized templates");
    templates
}

fn synthesize_stack(resolved: &ResolvedStack) -> StackTemplate {
    let stack = &resolved.stack;
    let resources = resolved
        .resource_order
        .iter()
        .filter_map(|id| {
            let group = stack
                .groups()
                .iter()
                .find(|g| g.resources.iter().any(|r| r.id() == id))?;
            let resource = group.resources.iter().find(|r| r.id() == id)?;
            let properties = resource
                .configuration()
                .iter()
                .map(|(k, v)| (k.clone(), config_value(v)))
                .collect::<serde_json::Map<_, _>>();
            Some(TemplateResource {
                id: id.clone(),
                kind: resource.kind().template_type().to_owned(),
                group: group.name.clone(),
                properties: Value::Object(properties),
                depends_on: resource.depends_on().to_vec(),
            })
        })
        .collect();

    let outputs = stack
        .outputs()
        .iter()
        .map(|o| TemplateOutput {
            key: o.key.clone(),
            description: o.description.clone(),
            value: output_value(&o.value),
            export_name: format!("{}:{}", stack.name(), o.key),
        })
        .collect();

    StackTemplate {
        stack: stack.name().clone(),
        environment: stack.environment().clone(),
        dependencies: stack.dependencies().to_vec(),
        resources,
        outputs,
    }
}

fn reference_value(r: &ResourceRef) -> Value {
    match &r.attribute {
        Some(attr) => json!({ "Fn::GetAtt": [r.resource, attr] }),
        None => json!({ "Ref": r.resource }),
    }
}

fn config_value(value: &ConfigValue) -> Value {
    match value {
        ConfigValue::Text(s) => Value::String(s.clone()),
        ConfigValue::Number(n) => json!(n),
        ConfigValue::Bool(b) => Value::Bool(*b),
        ConfigValue::List(items) => Value::Array(items.iter().map(config_value).collect()),
        ConfigValue::Ref(r) => reference_value(r),
        ConfigValue::Import(o) => json!({ "Fn::ImportValue": o.to_string() }),
        ConfigValue::Secret(s) => match &s.field {
            Some(field) => json!({ "Secret": s.name, "field": field }),
            None => json!({ "Secret": s.name }),
        },
    }
}

fn output_value(expr: &OutputExpr) -> Value {
    let part_value = |p: &ExprPart| match p {
        ExprPart::Literal(text) => Value::String(text.clone()),
        ExprPart::Attribute(r) => reference_value(r),
    };
    match expr.parts() {
        [] => Value::String(String::new()),
        [single] => part_value(single),
        parts => {
            let values: Vec<Value> = parts.iter().map(part_value).collect();
            json!({ "Fn::Join": ["", values] })
        }
    }
}

/// Writes every template into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns an I/O error if the directory or a file cannot be written.
pub fn write_templates(
    templates: &[StackTemplate],
    dir: &Path,
    format: TemplateFormat,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|source| StackweaveError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(templates.len());
    for (position, template) in templates.iter().enumerate() {
        let path = dir.join(template.file_name(position, format));
        std::fs::write(&path, template.render(format)?).map_err(|source| {
            StackweaveError::Io {
                path: path.clone(),
                source,
            }
        })?;
        tracing::debug!(path = %path.display(), "wrote template");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use stackweave_common::types::ResourceKind;

    use super::*;
    use crate::descriptor::{OutputRef, ResourceDescriptor};
    use crate::group::CompositeGroup;
    use crate::resolver::resolve;
    use crate::stack::{OutputDecl, Stack};

    fn app() -> ResolvedApp {
        let env = Environment::new("123456789012", "us-east-1");
        let mut lake = Stack::new("S3BucketStack", env.clone());
        lake.add_group(
            CompositeGroup::new("storage").with(
                ResourceDescriptor::builder(ResourceKind::ObjectStore, "lake")
                    .text("bucketName", "lake")
                    .build()
                    .expect("bucket"),
            ),
        )
        .expect("group");
        lake.add_output(OutputDecl::new("BucketName", "${lake}").expect("expr"))
            .expect("output");

        let mut api = Stack::new("FastApiAppStack", env);
        api.add_dependency("S3BucketStack");
        api.add_group(
            CompositeGroup::new("networking")
                .with(
                    ResourceDescriptor::builder(ResourceKind::SecurityGroup, "ssh-sg")
                        .attribute("vpc", "vpc", "vpcId")
                        .build()
                        .expect("sg"),
                )
                .with(
                    ResourceDescriptor::builder(ResourceKind::Network, "vpc")
                        .number("maxAzs", 2)
                        .build()
                        .expect("vpc"),
                ),
        )
        .expect("group");
        api.add_group(
            CompositeGroup::new("parameters").with(
                ResourceDescriptor::builder(ResourceKind::ParameterEntry, "bucket-param")
                    .text("parameterName", "/app/BUCKET_NAME")
                    .import("value", OutputRef::new("S3BucketStack", "BucketName"))
                    .build()
                    .expect("param"),
            ),
        )
        .expect("group");
        api.add_output(OutputDecl::new("VpcRef", "vpc ${vpc.vpcId}!").expect("expr"))
            .expect("output");

        resolve(&[api, lake]).expect("resolve")
    }

    #[test]
    fn templates_follow_emission_order() {
        let templates = synthesize(&app());
        let names: Vec<&str> = templates.iter().map(|t| t.stack.as_str()).collect();
        assert_eq!(names, vec!["S3BucketStack", "FastApiAppStack"]);
    }

    #[test]
    fn references_and_imports_render_as_intrinsics() {
        let templates = synthesize(&app());
        let json: Value =
            serde_json::from_str(&templates[1].render(TemplateFormat::Json).expect("render"))
                .expect("valid json");

        let resources = json["resources"].as_array().expect("resources");
        assert_eq!(resources[0]["id"], "vpc");
        assert_eq!(resources[1]["id"], "ssh-sg");
        assert_eq!(
            resources[1]["properties"]["vpc"],
            json!({ "Fn::GetAtt": ["vpc", "vpcId"] })
        );
        assert_eq!(resources[1]["dependsOn"], json!(["vpc"]));
        assert_eq!(
            resources[2]["properties"]["value"],
            json!({ "Fn::ImportValue": "S3BucketStack:BucketName" })
        );
        assert_eq!(json["dependencies"], json!(["S3BucketStack"]));
    }

    #[test]
    fn mixed_output_renders_as_join() {
        let templates = synthesize(&app());
        let output = &templates[1].outputs[0];
        assert_eq!(output.export_name, "FastApiAppStack:VpcRef");
        assert_eq!(
            output.value,
            json!({ "Fn::Join": ["", ["vpc ", { "Fn::GetAtt": ["vpc", "vpcId"] }, "!"]] })
        );
        assert_eq!(templates[0].outputs[0].value, json!({ "Ref": "lake" }));
    }

    #[test]
    fn yaml_rendering_contains_type_names() {
        let templates = synthesize(&app());
        let yaml = templates[0].render(TemplateFormat::Yaml).expect("yaml");
        assert!(yaml.contains("Storage::Bucket"), "got: {yaml}");
    }

    #[test]
    fn write_templates_numbers_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let written = write_templates(&synthesize(&app()), dir.path(), TemplateFormat::Json)
            .expect("write");
        let names: Vec<String> = written
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(
            names,
            vec![
                "01-S3BucketStack.template.json",
                "02-FastApiAppStack.template.json"
            ]
        );
        assert!(written.iter().all(|p| p.exists()));
    }
}
