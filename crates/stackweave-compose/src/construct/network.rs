//! Virtual network and security group constructs.

use stackweave_common::error::Result;
use stackweave_common::types::ResourceKind;

use super::{Ingress, Link};
use crate::descriptor::ResourceDescriptor;
use crate::group::CompositeGroup;

/// Layout of a public-subnet-only network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcSpec {
    /// Number of availability zones.
    pub max_azs: i64,
    /// Number of NAT gateways.
    pub nat_gateways: i64,
    /// Prefix length of each public subnet.
    pub cidr_mask: i64,
}

impl Default for VpcSpec {
    fn default() -> Self {
        Self {
            max_azs: 2,
            nat_gateways: 0,
            cidr_mask: 24,
        }
    }
}

/// Builds a network with one public subnet per availability zone.
///
/// # Errors
///
/// Returns an error if the descriptor is invalid.
pub fn vpc(id: &str, spec: &VpcSpec) -> Result<ResourceDescriptor> {
    ResourceDescriptor::builder(ResourceKind::Network, id)
        .number("maxAzs", spec.max_azs)
        .number("natGateways", spec.nat_gateways)
        .number("cidrMask", spec.cidr_mask)
        .text("subnetType", "PUBLIC")
        .flag("mapPublicIpOnLaunch", true)
        .build()
}

/// Builds a security group allowing all outbound traffic and the given
/// inbound rules.
///
/// # Errors
///
/// Returns an error if the descriptor is invalid.
pub fn security_group(
    id: &str,
    vpc: Link,
    description: &str,
    ingress: &[Ingress],
) -> Result<ResourceDescriptor> {
    ResourceDescriptor::builder(ResourceKind::SecurityGroup, id)
        .value("vpc", vpc)
        .text("description", description)
        .flag("allowAllOutbound", true)
        .list("ingress", ingress.iter().map(|i| i.to_value()).collect())
        .build()
}

/// The `networking` group: a network plus a security group opening SSH.
///
/// # Errors
///
/// Returns an error if a descriptor is invalid.
pub fn networking(vpc_id: &str, ssh_group_id: &str, spec: &VpcSpec) -> Result<CompositeGroup> {
    Ok(CompositeGroup::new("networking")
        .with(vpc(vpc_id, spec)?)
        .with(security_group(
            ssh_group_id,
            Link::local(vpc_id, "vpcId"),
            "Security Group for SSH",
            &[Ingress::any_ipv4(22, "SSH")],
        )?))
}
