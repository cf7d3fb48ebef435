//! Data lake bucket construct.

use stackweave_common::error::Result;
use stackweave_common::types::ResourceKind;

use crate::descriptor::{ConfigValue, ResourceDescriptor};
use crate::group::CompositeGroup;

/// Prefix under which raw data lands.
pub const LAKE_PREFIX: &str = "Lake/";

/// Days after which objects under [`LAKE_PREFIX`] expire.
pub const LAKE_EXPIRATION_DAYS: i64 = 365;

/// Builds the `storage` group: an unversioned bucket destroyed with its
/// stack, with a lifecycle rule expiring [`LAKE_PREFIX`] objects and a
/// policy letting the owning account put objects under that prefix.
///
/// # Errors
///
/// Returns a validation error if `bucket_name` is blank.
pub fn data_lake_bucket(id: &str, bucket_name: &str) -> Result<CompositeGroup> {
    let bucket = ResourceDescriptor::builder(ResourceKind::ObjectStore, id)
        .text("bucketName", bucket_name)
        .flag("versioned", false)
        .text("removalPolicy", "DESTROY")
        .flag("autoDeleteObjects", true)
        .list(
            "lifecycleRules",
            vec![ConfigValue::Text(format!(
                "prefix={LAKE_PREFIX} expirationDays={LAKE_EXPIRATION_DAYS}"
            ))],
        )
        .list(
            "policy",
            vec![ConfigValue::Text(format!(
                "allow s3:PutObject on {LAKE_PREFIX}* to account"
            ))],
        )
        .build()?;
    Ok(CompositeGroup::new("storage").with(bucket))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_requires_a_name() {
        let err = data_lake_bucket("lake", "").unwrap_err();
        assert!(err.to_string().contains("`bucketName`"), "got: {err}");
    }

    #[test]
    fn bucket_is_destroyed_with_stack() {
        let group = data_lake_bucket("lake", "example-lake").expect("valid");
        assert_eq!(
            group.resources[0].get("removalPolicy").and_then(ConfigValue::as_text),
            Some("DESTROY")
        );
    }
}
