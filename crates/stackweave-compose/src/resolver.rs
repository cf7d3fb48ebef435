//! Resolution of declared stacks into a frozen, ordered application.
//!
//! Validation runs first, then the inter-stack graph and every
//! intra-stack descriptor graph are resolved. Nothing is returned unless
//! every graph is acyclic.

use stackweave_common::constants::APP_SCOPE;
use stackweave_common::error::{Result, StackweaveError};
use stackweave_common::types::{ResourceId, StackName};

use crate::graph::DependencyGraph;
use crate::stack::Stack;
use crate::validator;

/// A stack together with the emission order of its descriptors.
#[derive(Debug, Clone)]
pub struct ResolvedStack {
    /// The frozen stack declaration.
    pub stack: Stack,
    /// Descriptor identifiers, dependencies first.
    pub resource_order: Vec<ResourceId>,
}

/// Every stack of an application in emission order.
#[derive(Debug, Clone)]
pub struct ResolvedApp {
    stacks: Vec<ResolvedStack>,
}

impl ResolvedApp {
    /// Stacks in emission order.
    pub fn stacks(&self) -> &[ResolvedStack] {
        &self.stacks
    }

    /// Stack names in emission order.
    pub fn order(&self) -> Vec<&StackName> {
        self.stacks.iter().map(|s| s.stack.name()).collect()
    }

    /// Looks up a resolved stack by name.
    pub fn get(&self, name: &StackName) -> Option<&ResolvedStack> {
        self.stacks.iter().find(|s| s.stack.name() == name)
    }
}

/// Validates and resolves a set of stacks.
///
/// # Errors
///
/// Returns a validation error for structural problems and
/// [`StackweaveError::CyclicDependency`] if any graph has a cycle.
pub fn resolve(stacks: &[Stack]) -> Result<ResolvedApp> {
    validator::validate(stacks)?;

    let mut graph = DependencyGraph::new(APP_SCOPE);
    for stack in stacks {
        let _ = graph.add_node(stack.name().as_str());
    }
    for stack in stacks {
        let dependent = graph.add_node(stack.name().as_str());
        for dep in stack.dependencies() {
            let dependency = graph.add_node(dep.as_str());
            graph.add_dependency(dependent, dependency);
        }
    }
    let order = graph.resolve_order()?;

    let mut resolved = Vec::with_capacity(order.len());
    for name in &order {
        let stack = stacks
            .iter()
            .find(|s| s.name().as_str() == name)
            .ok_or_else(|| StackweaveError::NotFound {
                kind: "stack",
                id: name.clone(),
            })?;
        resolved.push(ResolvedStack {
            resource_order: resolve_resources(stack)?,
            stack: stack.clone(),
        });
    }

    tracing::info!(?order, "resolved stack emission order");
    Ok(ResolvedApp { stacks: resolved })
}

/// Resolves the emission order of the descriptors of one stack.
///
/// Edges come from each descriptor's inferred and explicit dependencies.
///
/// # Errors
///
/// Returns [`StackweaveError::CyclicDependency`] scoped to the stack name.
pub fn resolve_resources(stack: &Stack) -> Result<Vec<ResourceId>> {
    let mut graph = DependencyGraph::new(stack.name().as_str());
    for resource in stack.resources() {
        let _ = graph.add_node(resource.id().as_str());
    }
    for resource in stack.resources() {
        let dependent = graph.add_node(resource.id().as_str());
        for dep in resource.depends_on() {
            let dependency = graph.add_node(dep.as_str());
            graph.add_dependency(dependent, dependency);
        }
    }
    Ok(graph
        .resolve_order()?
        .into_iter()
        .map(ResourceId::new)
        .collect())
}
