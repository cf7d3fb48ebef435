//! Parameter store constructs.

use stackweave_common::error::Result;
use stackweave_common::types::ResourceKind;

use crate::descriptor::{ConfigValue, ResourceDescriptor};
use crate::group::CompositeGroup;

/// Builds one parameter named `parameter_name`.
///
/// A [`ConfigValue::Secret`] value makes a `SecureString` parameter whose
/// value is supplied by the provisioning engine, never written into a
/// template.
///
/// # Errors
///
/// Returns a validation error if the name or a text value is blank.
pub fn parameter(
    id: &str,
    parameter_name: &str,
    value: impl Into<ConfigValue>,
) -> Result<ResourceDescriptor> {
    let value = value.into();
    let kind = if matches!(value, ConfigValue::Secret(_)) {
        "SecureString"
    } else {
        "String"
    };
    ResourceDescriptor::builder(ResourceKind::ParameterEntry, id)
        .text("parameterName", parameter_name)
        .text("type", kind)
        .value("value", value)
        .build()
}

/// Builds the `parameters` group from `(id, name, value)` entries, each
/// name prefixed with `prefix`.
///
/// # Errors
///
/// Returns the first invalid parameter.
pub fn parameter_group(
    prefix: &str,
    entries: Vec<(&str, &str, ConfigValue)>,
) -> Result<CompositeGroup> {
    let prefix = prefix.trim_end_matches('/');
    entries
        .into_iter()
        .try_fold(CompositeGroup::new("parameters"), |group, (id, name, value)| {
            Ok(group.with(parameter(id, &format!("{prefix}/{name}"), value)?))
        })
}
