//! DNS record construct.

use stackweave_common::error::Result;
use stackweave_common::types::ResourceKind;

use super::Link;
use crate::descriptor::ResourceDescriptor;

/// Builds an `A` alias record `record_name` in `zone_name` pointing at
/// `target`, typically a load balancer DNS name.
///
/// # Errors
///
/// Returns an error if the zone or record name is blank.
pub fn alias_record(
    id: &str,
    zone_name: &str,
    record_name: &str,
    target: Link,
) -> Result<ResourceDescriptor> {
    ResourceDescriptor::builder(ResourceKind::DnsRecord, id)
        .text("zoneName", zone_name)
        .text("recordName", record_name)
        .text("recordType", "A")
        .value("target", target)
        .build()
}
