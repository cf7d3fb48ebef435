//! Fluent API for declaring a stack.

use stackweave_common::error::Result;
use stackweave_common::types::{Environment, StackName};
use stackweave_compose::group::CompositeGroup;
use stackweave_compose::stack::{OutputDecl, Stack};

/// Builder for a [`Stack`]. Problems surface from [`StackBuilder::build`].
#[derive(Debug)]
pub struct StackBuilder {
    name: StackName,
    environment: Environment,
    dependencies: Vec<StackName>,
    groups: Vec<CompositeGroup>,
    outputs: Vec<(String, String, Option<String>)>,
}

impl StackBuilder {
    /// Creates a builder for a stack named `name` deployed into `environment`.
    #[must_use]
    pub fn new(name: impl Into<StackName>, environment: Environment) -> Self {
        Self {
            name: name.into(),
            environment,
            dependencies: Vec::new(),
            groups: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Declares that this stack is provisioned after `stack`.
    #[must_use]
    pub fn depends_on(mut self, stack: impl Into<StackName>) -> Self {
        self.dependencies.push(stack.into());
        self
    }

    /// Adds a composite group.
    #[must_use]
    pub fn group(mut self, group: CompositeGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Adds several composite groups in order.
    #[must_use]
    pub fn groups(mut self, groups: impl IntoIterator<Item = CompositeGroup>) -> Self {
        self.groups.extend(groups);
        self
    }

    /// Declares an output whose value is the expression `expression`,
    /// e.g. `"ssh ec2-user@${server.publicDnsName}"`.
    #[must_use]
    pub fn output(mut self, key: impl Into<String>, expression: impl Into<String>) -> Self {
        self.outputs.push((key.into(), expression.into(), None));
        self
    }

    /// Declares an output with an operator-facing description.
    #[must_use]
    pub fn described_output(
        mut self,
        key: impl Into<String>,
        expression: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.outputs
            .push((key.into(), expression.into(), Some(description.into())));
        self
    }

    /// Builds the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if two groups declare conflicting descriptors, an
    /// output expression is malformed, or an output key is repeated.
    pub fn build(self) -> Result<Stack> {
        let mut stack = Stack::new(self.name, self.environment);
        for dependency in self.dependencies {
            stack.add_dependency(dependency);
        }
        for group in self.groups {
            stack.add_group(group)?;
        }
        for (key, expression, description) in self.outputs {
            let mut output = OutputDecl::new(key, &expression)?;
            if let Some(description) = description {
                output = output.describe(description);
            }
            stack.add_output(output)?;
        }
        tracing::debug!(stack = %stack.name(), "stack declared");
        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use stackweave_compose::construct::object_store::data_lake_bucket;

    use super::*;

    fn env() -> Environment {
        Environment::new("123456789012", "us-east-1")
    }

    #[test]
    fn builds_stack_with_outputs_and_dependencies() {
        let stack = StackBuilder::new("S3BucketStack", env())
            .depends_on("Base")
            .group(data_lake_bucket("lake", "my-lake").expect("bucket"))
            .described_output("BucketName", "${lake}", "Data lake bucket")
            .build()
            .expect("stack");
        assert_eq!(stack.dependencies(), &[StackName::new("Base")]);
        assert_eq!(
            stack.output("BucketName").and_then(|o| o.description.as_deref()),
            Some("Data lake bucket")
        );
    }

    #[test]
    fn malformed_output_fails_at_build() {
        let err = StackBuilder::new("S3BucketStack", env())
            .output("Broken", "${lake")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("malformed"), "got: {err}");
    }

    #[test]
    fn repeated_output_key_fails_at_build() {
        let result = StackBuilder::new("S3BucketStack", env())
            .group(data_lake_bucket("lake", "my-lake").expect("bucket"))
            .output("BucketName", "${lake}")
            .output("BucketName", "${lake.arn}")
            .build();
        assert!(result.is_err());
    }
}
