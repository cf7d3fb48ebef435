//! Stacks: independently provisionable units of descriptors.
//!
//! A stack is plain data. Builders (see the `construct` module) produce
//! composite groups; the stack records them together with its explicit
//! stack dependencies and its declared outputs.

use serde::Serialize;
use stackweave_common::error::{Result, StackweaveError};
use stackweave_common::types::{Environment, ResourceId, StackName};

use crate::descriptor::{OutputRef, ResourceDescriptor};
use crate::expr::OutputExpr;
use crate::group::CompositeGroup;

/// A named value a stack exposes once provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDecl {
    /// Output key, unique within the stack.
    pub key: String,
    /// Expression over the stack's own resources.
    pub value: OutputExpr,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OutputDecl {
    /// Declares an output from an expression string.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression does not parse.
    pub fn new(key: impl Into<String>, expression: &str) -> Result<Self> {
        Ok(Self {
            key: key.into(),
            value: OutputExpr::parse(expression)?,
            description: None,
        })
    }

    /// Attaches a description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A top-level composite group plus the stacks it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stack {
    name: StackName,
    environment: Environment,
    groups: Vec<CompositeGroup>,
    dependencies: Vec<StackName>,
    outputs: Vec<OutputDecl>,
}

impl Stack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new(name: impl Into<StackName>, environment: Environment) -> Self {
        Self {
            name: name.into(),
            environment,
            groups: Vec::new(),
            dependencies: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Adds a composite group.
    ///
    /// Descriptors are deduplicated by identifier: re-adding an identical
    /// descriptor is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a different descriptor already uses
    /// one of the group's identifiers.
    pub fn add_group(&mut self, group: CompositeGroup) -> Result<()> {
        let mut kept = CompositeGroup::new(group.name);
        for resource in group.resources {
            let existing = self
                .resource(resource.id())
                .or_else(|| kept.resources.iter().find(|r| r.id() == resource.id()));
            match existing {
                Some(prev) if *prev == resource => {
                    tracing::debug!(stack = %self.name, id = %resource.id(), "skipping identical descriptor");
                }
                Some(_) => {
                    return Err(StackweaveError::validation(
                        format!("stack {}", self.name),
                        resource.id().as_str(),
                        "is already used by a different resource",
                    ));
                }
                None => kept.resources.push(resource),
            }
        }
        self.groups.push(kept);
        Ok(())
    }

    /// Declares that this stack must be emitted after `dependency`.
    pub fn add_dependency(&mut self, dependency: impl Into<StackName>) {
        let dependency = dependency.into();
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
    }

    /// Declares an output.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the key is already declared.
    pub fn add_output(&mut self, output: OutputDecl) -> Result<()> {
        if self.output(&output.key).is_some() {
            return Err(StackweaveError::validation(
                format!("stack {}", self.name),
                output.key,
                "is declared as an output more than once",
            ));
        }
        self.outputs.push(output);
        Ok(())
    }

    /// Stack name.
    pub const fn name(&self) -> &StackName {
        &self.name
    }

    /// Account and region.
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Composite groups in declaration order.
    pub fn groups(&self) -> &[CompositeGroup] {
        &self.groups
    }

    /// Explicit stack dependencies in declaration order.
    pub fn dependencies(&self) -> &[StackName] {
        &self.dependencies
    }

    /// Declared outputs.
    pub fn outputs(&self) -> &[OutputDecl] {
        &self.outputs
    }

    /// Looks up a declared output.
    pub fn output(&self, key: &str) -> Option<&OutputDecl> {
        self.outputs.iter().find(|o| o.key == key)
    }

    /// Every descriptor in declaration order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.groups.iter().flat_map(|g| g.resources.iter())
    }

    /// Looks up a descriptor by identifier.
    pub fn resource(&self, id: &ResourceId) -> Option<&ResourceDescriptor> {
        self.resources().find(|r| r.id() == id)
    }

    /// Every distinct output this stack imports, in first-use order.
    pub fn imports(&self) -> Vec<&OutputRef> {
        let mut out: Vec<&OutputRef> = Vec::new();
        for import in self.resources().flat_map(ResourceDescriptor::imports) {
            if !out.contains(&import) {
                out.push(import);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use stackweave_common::types::ResourceKind;

    use super::*;

    fn env() -> Environment {
        Environment::new("123456789012", "us-east-1")
    }

    fn bucket(name: &str) -> ResourceDescriptor {
        ResourceDescriptor::builder(ResourceKind::ObjectStore, "lake")
            .text("bucketName", name)
            .build()
            .expect("valid bucket")
    }

    #[test]
    fn identical_descriptor_is_deduplicated() {
        let mut stack = Stack::new("S3BucketStack", env());
        stack
            .add_group(CompositeGroup::new("storage").with(bucket("a")))
            .expect("first add");
        stack
            .add_group(CompositeGroup::new("storage-again").with(bucket("a")))
            .expect("identical add");
        assert_eq!(stack.resources().count(), 1);
    }

    #[test]
    fn conflicting_descriptor_is_rejected() {
        let mut stack = Stack::new("S3BucketStack", env());
        stack
            .add_group(CompositeGroup::new("storage").with(bucket("a")))
            .expect("first add");
        let err = stack
            .add_group(CompositeGroup::new("storage").with(bucket("b")))
            .unwrap_err();
        assert!(err.to_string().contains("lake"), "got: {err}");
    }

    #[test]
    fn dependencies_keep_set_semantics() {
        let mut stack = Stack::new("Route53Stack", env());
        stack.add_dependency("NextJsAppStack");
        stack.add_dependency("FastApiAppStack");
        stack.add_dependency("NextJsAppStack");
        assert_eq!(
            stack.dependencies(),
            &[StackName::new("NextJsAppStack"), StackName::new("FastApiAppStack")]
        );
    }

    #[test]
    fn duplicate_output_key_is_rejected() {
        let mut stack = Stack::new("S3BucketStack", env());
        stack
            .add_output(OutputDecl::new("BucketName", "${lake}").expect("expr"))
            .expect("first output");
        assert!(
            stack
                .add_output(OutputDecl::new("BucketName", "${lake.arn}").expect("expr"))
                .is_err()
        );
    }
}
