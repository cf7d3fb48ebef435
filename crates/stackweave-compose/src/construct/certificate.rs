//! DNS-validated certificate construct.

use stackweave_common::error::Result;
use stackweave_common::types::ResourceKind;

use crate::descriptor::ResourceDescriptor;

/// Builds a certificate for `domain_name`, validated through records in
/// `hosted_zone`.
///
/// # Errors
///
/// Returns a validation error naming `domainName` if it is blank.
pub fn certificate(id: &str, domain_name: &str, hosted_zone: &str) -> Result<ResourceDescriptor> {
    ResourceDescriptor::builder(ResourceKind::Certificate, id)
        .text("domainName", domain_name)
        .text("validation", "DNS")
        .text("hostedZone", hosted_zone)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_domain_is_rejected_by_name() {
        let err = certificate("api-cert", "", "example.com").unwrap_err();
        assert!(err.to_string().contains("`domainName`"), "got: {err}");
    }

    #[test]
    fn certificate_has_no_dependencies() {
        let cert = certificate("api-cert", "api.example.com", "example.com").expect("valid");
        assert!(cert.depends_on().is_empty());
    }
}
