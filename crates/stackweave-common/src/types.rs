//! Domain primitive types used across the stackweave workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StackweaveError;

/// Name of a stack, unique within an application.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackName(String);

impl StackName {
    /// Creates a stack name from a string value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StackName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StackName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of a resource descriptor, unique within its owning stack.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates a resource identifier from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Account and region a stack is deployed into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    /// Cloud account identifier.
    pub account: String,
    /// Region identifier, e.g. `us-east-1`.
    pub region: String,
}

impl Environment {
    /// Creates an environment from an account and a region.
    #[must_use]
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account, self.region)
    }
}

/// Kind of managed entity a resource descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Virtual network with its subnets.
    Network,
    /// Firewall rule set attached to a network.
    SecurityGroup,
    /// Virtual machine instance.
    Compute,
    /// Application load balancer with listeners and target group.
    LoadBalancer,
    /// DNS-validated TLS certificate.
    Certificate,
    /// DNS record in a hosted zone.
    DnsRecord,
    /// Object storage bucket.
    ObjectStore,
    /// Data warehouse cluster.
    DataWarehouse,
    /// Delivery pipeline fed from a source repository.
    Pipeline,
    /// Deployment application or deployment group targeting instances.
    Deployment,
    /// Entry in a parameter store.
    ParameterEntry,
    /// Identity role assumed by a managed service.
    Role,
}

impl ResourceKind {
    /// Configuration fields that must be present for this kind, in the
    /// order they are checked.
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Network => &["maxAzs"],
            Self::SecurityGroup => &["vpc"],
            Self::Compute => &["vpc", "instanceType", "cpuType"],
            Self::LoadBalancer => &["vpc", "target", "certificate"],
            Self::Certificate => &["domainName"],
            Self::DnsRecord => &["zoneName", "recordName", "target"],
            Self::ObjectStore => &["bucketName"],
            Self::DataWarehouse => &["masterUsername", "databaseName", "nodeType"],
            Self::Pipeline => &["owner", "repository", "branch"],
            Self::Deployment => &["applicationName"],
            Self::ParameterEntry => &["parameterName", "value"],
            Self::Role => &["assumedBy"],
        }
    }

    /// Type name emitted in synthesized templates.
    #[must_use]
    pub const fn template_type(self) -> &'static str {
        match self {
            Self::Network => "Network::Vpc",
            Self::SecurityGroup => "Network::SecurityGroup",
            Self::Compute => "Compute::Instance",
            Self::LoadBalancer => "Edge::LoadBalancer",
            Self::Certificate => "Edge::Certificate",
            Self::DnsRecord => "Dns::Record",
            Self::ObjectStore => "Storage::Bucket",
            Self::DataWarehouse => "Analytics::Cluster",
            Self::Pipeline => "Delivery::Pipeline",
            Self::Deployment => "Delivery::Deployment",
            Self::ParameterEntry => "Config::Parameter",
            Self::Role => "Identity::Role",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::SecurityGroup => "security-group",
            Self::Compute => "compute",
            Self::LoadBalancer => "load-balancer",
            Self::Certificate => "certificate",
            Self::DnsRecord => "dns-record",
            Self::ObjectStore => "object-store",
            Self::DataWarehouse => "data-warehouse",
            Self::Pipeline => "pipeline",
            Self::Deployment => "deployment",
            Self::ParameterEntry => "parameter",
            Self::Role => "role",
        };
        write!(f, "{name}")
    }
}

/// Processor architecture of a compute instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpuType {
    /// 64-bit x86.
    #[serde(rename = "X86_64")]
    X86_64,
    /// 64-bit ARM (Graviton).
    #[serde(rename = "ARM_64")]
    Arm64,
}

impl CpuType {
    /// Instance family used for this architecture.
    #[must_use]
    pub const fn instance_family(self) -> &'static str {
        match self {
            Self::X86_64 => "t3",
            Self::Arm64 => "t4g",
        }
    }
}

impl fmt::Display for CpuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X86_64 => write!(f, "X86_64"),
            Self::Arm64 => write!(f, "ARM_64"),
        }
    }
}

impl FromStr for CpuType {
    type Err = StackweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X86_64" => Ok(Self::X86_64),
            "ARM_64" | "ARM64" => Ok(Self::Arm64),
            other => Err(StackweaveError::validation(
                "environment",
                crate::constants::ENV_CPU_TYPE,
                format!("must be X86_64 or ARM_64, got \"{other}\""),
            )),
        }
    }
}

/// Size class of a compute instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstanceSize {
    /// `nano`.
    Nano,
    /// `micro`.
    Micro,
    /// `small`.
    Small,
    /// `medium`.
    Medium,
    /// `large`.
    Large,
    /// `xlarge`.
    Xlarge,
}

impl InstanceSize {
    /// Lower-case suffix used in instance type names.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Nano => "nano",
            Self::Micro => "micro",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Xlarge => "xlarge",
        }
    }
}

impl fmt::Display for InstanceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix().to_ascii_uppercase())
    }
}

impl FromStr for InstanceSize {
    type Err = StackweaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nano" => Ok(Self::Nano),
            "micro" => Ok(Self::Micro),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "xlarge" => Ok(Self::Xlarge),
            other => Err(StackweaveError::validation(
                "environment",
                crate::constants::ENV_INSTANCE_SIZE,
                format!("is not a known instance size: \"{other}\""),
            )),
        }
    }
}

/// Returns the instance type name for an architecture and size, e.g. `t3.micro`.
#[must_use]
pub fn instance_type(cpu: CpuType, size: InstanceSize) -> String {
    format!("{}.{}", cpu.instance_family(), size.suffix())
}
