//! Compute instance construct.

use stackweave_common::error::Result;
use stackweave_common::types::{CpuType, InstanceSize, ResourceKind, instance_type};

use super::Link;
use crate::descriptor::{ConfigValue, ResourceDescriptor};
use crate::group::CompositeGroup;

/// Language runtime installed on a server at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    /// Python with the API dependencies.
    Python,
    /// Node.js for the web application.
    NodeJs,
}

impl Runtime {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::NodeJs => "nodejs",
        }
    }
}

/// Parameters of an application server.
#[derive(Debug, Clone)]
pub struct ServerSpec {
    /// Descriptor identifier.
    pub id: String,
    /// Network the instance is placed in.
    pub vpc: Link,
    /// Security group granting SSH access.
    pub ssh_security_group: Link,
    /// Processor architecture.
    pub cpu_type: CpuType,
    /// Size class.
    pub instance_size: InstanceSize,
    /// Log level exported to the server environment.
    pub log_level: String,
    /// Public key installed for the default user, if any.
    pub ssh_pub_key: Option<String>,
    /// Runtime installed at boot.
    pub runtime: Runtime,
    /// Tag the deployment group selects the instance by, as `key=value`.
    pub deploy_tag: (String, String),
}

/// Builds the `compute` group holding one application server.
///
/// The instance type is derived from the architecture and size, e.g.
/// `t3.micro` or `t4g.micro`.
///
/// # Errors
///
/// Returns an error if the descriptor is invalid.
pub fn server(spec: &ServerSpec) -> Result<CompositeGroup> {
    let mut builder = ResourceDescriptor::builder(ResourceKind::Compute, spec.id.as_str())
        .value("vpc", spec.vpc.clone())
        .list("securityGroups", vec![spec.ssh_security_group.clone().into()])
        .text("instanceType", instance_type(spec.cpu_type, spec.instance_size))
        .text("cpuType", spec.cpu_type.to_string())
        .text("machineImage", "amazon-linux-2023")
        .text("runtime", spec.runtime.as_str())
        .text("logLevel", spec.log_level.as_str())
        .list(
            "managedPolicies",
            vec![ConfigValue::from("AmazonSSMManagedInstanceCore")],
        )
        .list(
            "tags",
            vec![ConfigValue::Text(format!(
                "{}={}",
                spec.deploy_tag.0, spec.deploy_tag.1
            ))],
        );
    if let Some(key) = &spec.ssh_pub_key {
        builder = builder.text("sshPubKey", key.as_str());
    }
    Ok(CompositeGroup::new("compute").with(builder.build()?))
}
