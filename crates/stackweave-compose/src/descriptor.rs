//! Resource descriptors: immutable records of one managed entity.
//!
//! A descriptor's `kind` plus its `configuration` fully determine its
//! meaning. Construction checks the fields the kind requires and infers
//! intra-stack dependencies from every [`ResourceRef`] in the
//! configuration. Construction is pure data assembly.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use stackweave_common::error::{Result, StackweaveError};
use stackweave_common::types::{ResourceId, ResourceKind, StackName};

/// Reference to another descriptor of the same stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Referenced descriptor.
    pub resource: ResourceId,
    /// Runtime attribute of the referenced resource, if not the resource itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl ResourceRef {
    /// References the resource itself.
    #[must_use]
    pub fn to(resource: impl Into<ResourceId>) -> Self {
        Self {
            resource: resource.into(),
            attribute: None,
        }
    }

    /// References a runtime attribute of the resource, e.g. `instanceId`.
    #[must_use]
    pub fn attr(resource: impl Into<ResourceId>, attribute: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            attribute: Some(attribute.into()),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attr) => write!(f, "{}.{attr}", self.resource),
            None => write!(f, "{}", self.resource),
        }
    }
}

/// Late-bound reference to an output of another stack.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutputRef {
    /// Producing stack.
    pub stack: StackName,
    /// Output key declared by the producer.
    pub key: String,
}

impl OutputRef {
    /// Creates a reference to `key` of `stack`.
    #[must_use]
    pub fn new(stack: impl Into<StackName>, key: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for OutputRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stack, self.key)
    }
}

/// Reference to a secret held by an external secrets manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretRef {
    /// Secret name.
    pub name: String,
    /// JSON field inside the secret, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl SecretRef {
    /// A whole secret supplied to the provisioning engine by name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: None,
        }
    }
}

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigValue {
    /// Plain string.
    Text(String),
    /// Integer.
    Number(i64),
    /// Boolean flag.
    Bool(bool),
    /// Ordered list of values.
    List(Vec<ConfigValue>),
    /// Reference to a descriptor of the same stack.
    Ref(ResourceRef),
    /// Late-bound output of another stack.
    Import(OutputRef),
    /// Externally held secret.
    Secret(SecretRef),
}

impl ConfigValue {
    /// A blank `Text` does not satisfy a required field.
    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a ResourceRef>) {
        match self {
            Self::Ref(r) => out.push(r),
            Self::List(items) => items.iter().for_each(|v| v.collect_refs(out)),
            _ => {}
        }
    }

    fn collect_imports<'a>(&'a self, out: &mut Vec<&'a OutputRef>) {
        match self {
            Self::Import(r) => out.push(r),
            Self::List(items) => items.iter().for_each(|v| v.collect_imports(out)),
            _ => {}
        }
    }

    /// Returns the string if this is a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<ResourceRef> for ConfigValue {
    fn from(value: ResourceRef) -> Self {
        Self::Ref(value)
    }
}

impl From<OutputRef> for ConfigValue {
    fn from(value: OutputRef) -> Self {
        Self::Import(value)
    }
}

/// Ordered key/value configuration of a descriptor.
pub type Configuration = BTreeMap<String, ConfigValue>;

/// Immutable description of one managed entity.
///
/// Only constructed through [`ResourceDescriptor::new`] or the builder, so
/// required fields and inferred dependencies always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    kind: ResourceKind,
    id: ResourceId,
    configuration: Configuration,
    depends_on: Vec<ResourceId>,
}

impl ResourceDescriptor {
    /// Creates a descriptor, inferring its dependencies from references.
    ///
    /// # Errors
    ///
    /// Returns [`StackweaveError::Validation`] naming the first required
    /// field of `kind` that is absent or blank.
    pub fn new(
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        configuration: Configuration,
    ) -> Result<Self> {
        Self::assemble(kind, id.into(), configuration, Vec::new())
    }

    /// Starts a consuming builder for a descriptor.
    #[must_use]
    pub fn builder(kind: ResourceKind, id: impl Into<ResourceId>) -> DescriptorBuilder {
        DescriptorBuilder {
            kind,
            id: id.into(),
            configuration: Configuration::new(),
            depends_on: Vec::new(),
        }
    }

    fn assemble(
        kind: ResourceKind,
        id: ResourceId,
        configuration: Configuration,
        explicit: Vec<ResourceId>,
    ) -> Result<Self> {
        for field in kind.required_fields() {
            match configuration.get(*field) {
                Some(value) if !value.is_blank() => {}
                _ => return Err(StackweaveError::missing(format!("{kind} {id}"), *field)),
            }
        }

        let mut depends_on = explicit;
        let mut refs = Vec::new();
        configuration.values().for_each(|v| v.collect_refs(&mut refs));
        for r in refs {
            if !depends_on.contains(&r.resource) {
                depends_on.push(r.resource.clone());
            }
        }

        tracing::debug!(%id, %kind, deps = depends_on.len(), "descriptor assembled");
        Ok(Self {
            kind,
            id,
            configuration,
            depends_on,
        })
    }

    /// Kind of managed entity.
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Identifier, unique within the owning stack.
    pub const fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Full configuration.
    pub const fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Looks up one configuration value.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.configuration.get(key)
    }

    /// Descriptors of the same stack this one must follow.
    pub fn depends_on(&self) -> &[ResourceId] {
        &self.depends_on
    }

    /// Every intra-stack reference found in the configuration.
    pub fn references(&self) -> Vec<&ResourceRef> {
        let mut out = Vec::new();
        self.configuration
            .values()
            .for_each(|v| v.collect_refs(&mut out));
        out
    }

    /// Every cross-stack import found in the configuration.
    pub fn imports(&self) -> Vec<&OutputRef> {
        let mut out = Vec::new();
        self.configuration
            .values()
            .for_each(|v| v.collect_imports(&mut out));
        out
    }
}

/// Consuming builder for [`ResourceDescriptor`].
#[derive(Debug)]
pub struct DescriptorBuilder {
    kind: ResourceKind,
    id: ResourceId,
    configuration: Configuration,
    depends_on: Vec<ResourceId>,
}

impl DescriptorBuilder {
    /// Sets any configuration value.
    #[must_use]
    pub fn value(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        let _ = self.configuration.insert(key.into(), value.into());
        self
    }

    /// Sets a string value.
    #[must_use]
    pub fn text(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.value(key, ConfigValue::Text(value.into()))
    }

    /// Sets an integer value.
    #[must_use]
    pub fn number(self, key: impl Into<String>, value: i64) -> Self {
        self.value(key, ConfigValue::Number(value))
    }

    /// Sets a boolean value.
    #[must_use]
    pub fn flag(self, key: impl Into<String>, value: bool) -> Self {
        self.value(key, ConfigValue::Bool(value))
    }

    /// Sets a list value.
    #[must_use]
    pub fn list(self, key: impl Into<String>, items: Vec<ConfigValue>) -> Self {
        self.value(key, ConfigValue::List(items))
    }

    /// References another descriptor of the same stack.
    #[must_use]
    pub fn reference(self, key: impl Into<String>, resource: impl Into<ResourceId>) -> Self {
        self.value(key, ResourceRef::to(resource))
    }

    /// References a runtime attribute of another descriptor of the same stack.
    #[must_use]
    pub fn attribute(
        self,
        key: impl Into<String>,
        resource: impl Into<ResourceId>,
        attribute: impl Into<String>,
    ) -> Self {
        self.value(key, ResourceRef::attr(resource, attribute))
    }

    /// Imports an output of another stack.
    #[must_use]
    pub fn import(self, key: impl Into<String>, output: OutputRef) -> Self {
        self.value(key, output)
    }

    /// References an externally held secret.
    #[must_use]
    pub fn secret(
        self,
        key: impl Into<String>,
        name: impl Into<String>,
        field: Option<&str>,
    ) -> Self {
        self.value(
            key,
            ConfigValue::Secret(SecretRef {
                name: name.into(),
                field: field.map(str::to_owned),
            }),
        )
    }

    /// Adds an explicit dependency not expressed through a reference.
    #[must_use]
    pub fn depends_on(mut self, resource: impl Into<ResourceId>) -> Self {
        let resource = resource.into();
        if !self.depends_on.contains(&resource) {
            self.depends_on.push(resource);
        }
        self
    }

    /// Builds the descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field of the kind is missing.
    pub fn build(self) -> Result<ResourceDescriptor> {
        ResourceDescriptor::assemble(self.kind, self.id, self.configuration, self.depends_on)
    }
}
