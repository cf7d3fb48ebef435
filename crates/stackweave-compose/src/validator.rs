//! Static validation of declared stacks.
//!
//! Checks for duplicate names, undefined references, and undeclared
//! cross-stack consumption before any graph is resolved.

use std::collections::{HashMap, HashSet};

use stackweave_common::error::{Result, StackweaveError};
use stackweave_common::types::StackName;

use crate::stack::Stack;

/// Validates a set of stacks for structural correctness.
///
/// # Checks performed
///
/// 1. No duplicate stack names.
/// 2. Every stack dependency names a declared stack other than itself.
/// 3. Every intra-stack dependency and output attribute names a
///    descriptor of the same stack.
/// 4. Every import targets a stack listed in the consumer's dependencies
///    and a key that stack declares.
/// 5. No duplicate output keys within a stack.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate(stacks: &[Stack]) -> Result<()> {
    tracing::info!(stacks = stacks.len(), "validating stack declarations");
    let by_name = check_duplicate_stacks(stacks)?;
    check_stack_dependencies(stacks, &by_name)?;
    for stack in stacks {
        check_intra_stack_references(stack)?;
        check_imports(stack, &by_name)?;
        check_duplicate_outputs(stack)?;
    }
    Ok(())
}

fn check_duplicate_stacks(stacks: &[Stack]) -> Result<HashMap<&StackName, &Stack>> {
    let mut by_name = HashMap::new();
    for stack in stacks {
        if by_name.insert(stack.name(), stack).is_some() {
            return Err(StackweaveError::validation(
                "app",
                stack.name().as_str(),
                "is declared as a stack more than once",
            ));
        }
    }
    Ok(by_name)
}

fn check_stack_dependencies(
    stacks: &[Stack],
    by_name: &HashMap<&StackName, &Stack>,
) -> Result<()> {
    for stack in stacks {
        for dep in stack.dependencies() {
            if dep == stack.name() {
                return Err(StackweaveError::CyclicDependency {
                    scope: stackweave_common::constants::APP_SCOPE.to_owned(),
                    cycle: vec![dep.to_string(), dep.to_string()],
                });
            }
            if !by_name.contains_key(dep) {
                return Err(StackweaveError::NotFound {
                    kind: "stack",
                    id: format!("\"{dep}\" declared as a dependency of \"{}\"", stack.name()),
                });
            }
        }
    }
    Ok(())
}

fn check_intra_stack_references(stack: &Stack) -> Result<()> {
    let ids: HashSet<_> = stack.resources().map(|r| r.id()).collect();

    for resource in stack.resources() {
        for dep in resource.depends_on() {
            if !ids.contains(dep) {
                return Err(StackweaveError::validation(
                    format!("{} {} in stack {}", resource.kind(), resource.id(), stack.name()),
                    dep.as_str(),
                    "references a resource that is not defined in this stack",
                ));
            }
        }
    }

    for output in stack.outputs() {
        for r in output.value.references() {
            if !ids.contains(&r.resource) {
                return Err(StackweaveError::validation(
                    format!("output {} of stack {}", output.key, stack.name()),
                    r.resource.as_str(),
                    "references a resource that is not defined in this stack",
                ));
            }
        }
    }
    Ok(())
}

fn check_imports(stack: &Stack, by_name: &HashMap<&StackName, &Stack>) -> Result<()> {
    for import in stack.imports() {
        if !stack.dependencies().contains(&import.stack) {
            return Err(StackweaveError::validation(
                format!("stack {}", stack.name()),
                import.to_string(),
                format!(
                    "imports from {} which is not a declared dependency",
                    import.stack
                ),
            ));
        }
        let declared = by_name
            .get(&import.stack)
            .is_some_and(|producer| producer.output(&import.key).is_some());
        if !declared {
            return Err(StackweaveError::validation(
                format!("stack {}", stack.name()),
                import.to_string(),
                format!("is not an output declared by {}", import.stack),
            ));
        }
    }
    Ok(())
}

fn check_duplicate_outputs(stack: &Stack) -> Result<()> {
    let mut seen = HashSet::new();
    for output in stack.outputs() {
        if !seen.insert(output.key.as_str()) {
            return Err(StackweaveError::validation(
                format!("stack {}", stack.name()),
                output.key.as_str(),
                "is declared as an output more than once",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use stackweave_common::types::{Environment, ResourceKind};

    use super::*;
    use crate::descriptor::{OutputRef, ResourceDescriptor};
    use crate::group::CompositeGroup;
    use crate::stack::OutputDecl;

    fn env() -> Environment {
        Environment::new("123456789012", "us-east-1")
    }

    fn producer() -> Stack {
        let mut stack = Stack::new("S3BucketStack", env());
        stack
            .add_group(
                CompositeGroup::new("storage").with(
                    ResourceDescriptor::builder(ResourceKind::ObjectStore, "lake")
                        .text("bucketName", "lake")
                        .build()
                        .expect("bucket"),
                ),
            )
            .expect("group");
        stack
            .add_output(OutputDecl::new("BucketName", "${lake}").expect("expr"))
            .expect("output");
        stack
    }

    fn consumer(key: &str, declare_dependency: bool) -> Stack {
        let mut stack = Stack::new("FastApiAppStack", env());
        stack
            .add_group(
                CompositeGroup::new("parameters").with(
                    ResourceDescriptor::builder(ResourceKind::ParameterEntry, "bucket-param")
                        .text("parameterName", "/app/BUCKET_NAME")
                        .import("value", OutputRef::new("S3BucketStack", key))
                        .build()
                        .expect("parameter"),
                ),
            )
            .expect("group");
        if declare_dependency {
            stack.add_dependency("S3BucketStack");
        }
        stack
    }

    #[test]
    fn validate_empty_app_succeeds() {
        assert!(validate(&[]).is_ok());
    }

    #[test]
    fn validate_declared_import_succeeds() {
        assert!(validate(&[producer(), consumer("BucketName", true)]).is_ok());
    }

    #[test]
    fn validate_duplicate_stack_name_fails() {
        let err = validate(&[producer(), producer()]).unwrap_err();
        assert!(err.to_string().contains("more than once"), "got: {err}");
    }

    #[test]
    fn validate_unknown_dependency_fails() {
        let mut stack = producer();
        stack.add_dependency("GhostStack");
        let err = validate(&[stack]).unwrap_err();
        assert!(err.to_string().contains("GhostStack"), "got: {err}");
    }

    #[test]
    fn validate_self_dependency_is_a_cycle() {
        let mut stack = producer();
        stack.add_dependency("S3BucketStack");
        let err = validate(&[stack]).unwrap_err();
        assert!(matches!(err, StackweaveError::CyclicDependency { .. }), "got: {err}");
    }

    #[test]
    fn validate_undeclared_import_fails() {
        let err = validate(&[producer(), consumer("BucketName", false)]).unwrap_err();
        assert!(err.to_string().contains("not a declared dependency"), "got: {err}");
    }

    #[test]
    fn validate_unknown_output_key_fails() {
        let err = validate(&[producer(), consumer("BucketArn", true)]).unwrap_err();
        assert!(err.to_string().contains("BucketArn"), "got: {err}");
    }

    #[test]
    fn validate_dangling_reference_fails() {
        let mut stack = Stack::new("FastApiAppStack", env());
        stack
            .add_group(
                CompositeGroup::new("networking").with(
                    ResourceDescriptor::builder(ResourceKind::SecurityGroup, "ssh-sg")
                        .reference("vpc", "vpc")
                        .build()
                        .expect("sg"),
                ),
            )
            .expect("group");
        let err = validate(&[stack]).unwrap_err();
        assert!(err.to_string().contains("`vpc`"), "got: {err}");
    }

    #[test]
    fn validate_dangling_output_attribute_fails() {
        let mut stack = producer();
        stack
            .add_output(OutputDecl::new("sshCommand", "ssh ${server.publicDnsName}").expect("expr"))
            .expect("output");
        let err = validate(&[stack]).unwrap_err();
        assert!(err.to_string().contains("server"), "got: {err}");
    }
}
