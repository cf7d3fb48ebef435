//! Application load balancer construct.

use stackweave_common::error::Result;
use stackweave_common::types::ResourceKind;

use super::network::security_group;
use super::{Ingress, Link};
use crate::descriptor::{ConfigValue, ResourceDescriptor};
use crate::group::CompositeGroup;

/// Builds the `edge` group: a security group open on 80/443 and an
/// internet-facing load balancer.
///
/// The balancer forwards HTTPS on 443 to an HTTP target group on port 80
/// holding `instance`, and answers plain HTTP on 80 with a permanent
/// redirect to HTTPS.
///
/// # Errors
///
/// Returns an error if a descriptor is invalid.
pub fn alb(id: &str, vpc: &Link, instance: &str, certificate: Link) -> Result<CompositeGroup> {
    let sg_id = format!("{id}-sg");
    let sg = security_group(
        &sg_id,
        vpc.clone(),
        "Load balancer ingress",
        &[
            Ingress::any_ipv4(80, "Allow HTTP traffic"),
            Ingress::any_ipv4(443, "Allow HTTPS traffic"),
        ],
    )?;

    let balancer = ResourceDescriptor::builder(ResourceKind::LoadBalancer, id)
        .value("vpc", vpc.clone())
        .flag("internetFacing", true)
        .attribute("securityGroup", sg_id.as_str(), "securityGroupId")
        .attribute("target", instance, "instanceId")
        .text("targetGroup", "HTTP:80/instance")
        .value("certificate", certificate)
        .list(
            "listeners",
            vec![
                ConfigValue::from("HTTPS:443 forward target-group"),
                ConfigValue::from("HTTP:80 redirect HTTPS:443 permanent"),
            ],
        )
        .build()?;

    Ok(CompositeGroup::new("edge").with(sg).with(balancer))
}
