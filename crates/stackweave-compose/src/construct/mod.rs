//! Constructs: sub-builders that assemble composite groups.
//!
//! Each construct threads references between the descriptors it creates,
//! so intra-stack ordering is derived from reference use. Values owned by
//! another stack are passed in as [`Link::Imported`] and stay late-bound.

pub mod certificate;
pub mod compute;
pub mod data_warehouse;
pub mod dns;
pub mod load_balancer;
pub mod network;
pub mod object_store;
pub mod parameters;
pub mod pipeline;

use crate::descriptor::{ConfigValue, OutputRef, ResourceRef};

/// A value that is either owned by the current stack or imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// Attribute of a descriptor of the current stack.
    Local(ResourceRef),
    /// Output of another stack.
    Imported(OutputRef),
}

impl Link {
    /// Links a runtime attribute of a descriptor of the current stack.
    #[must_use]
    pub fn local(resource: &str, attribute: &str) -> Self {
        Self::Local(ResourceRef::attr(resource, attribute))
    }

    /// Links an output of another stack.
    #[must_use]
    pub fn imported(stack: &str, key: &str) -> Self {
        Self::Imported(OutputRef::new(stack, key))
    }
}

impl From<Link> for ConfigValue {
    fn from(link: Link) -> Self {
        match link {
            Link::Local(r) => Self::Ref(r),
            Link::Imported(o) => Self::Import(o),
        }
    }
}

/// An inbound firewall rule: TCP port plus description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ingress {
    /// TCP port.
    pub port: u16,
    /// Rule description.
    pub description: &'static str,
}

impl Ingress {
    /// Rule allowing `port` from any IPv4 address.
    #[must_use]
    pub const fn any_ipv4(port: u16, description: &'static str) -> Self {
        Self { port, description }
    }

    pub(crate) fn to_value(self) -> ConfigValue {
        ConfigValue::Text(format!("0.0.0.0/0:tcp/{} ({})", self.port, self.description))
    }
}
