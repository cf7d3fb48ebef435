//! Composite groups: named collections of descriptors considered together.

use serde::Serialize;

use crate::descriptor::ResourceDescriptor;

/// A named collection of descriptors, e.g. `networking` or `edge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeGroup {
    /// Group name.
    pub name: String,
    /// Descriptors in declaration order.
    pub resources: Vec<ResourceDescriptor>,
}

impl CompositeGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
        }
    }

    /// Appends a descriptor.
    #[must_use]
    pub fn with(mut self, resource: ResourceDescriptor) -> Self {
        self.resources.push(resource);
        self
    }
}
