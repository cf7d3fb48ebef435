//! Data warehouse construct: isolated network, access role, cluster, and
//! connection parameters.

use stackweave_common::error::Result;
use stackweave_common::types::ResourceKind;

use super::network::{VpcSpec, security_group, vpc};
use super::parameters::parameter_group;
use super::{Ingress, Link};
use crate::descriptor::{ConfigValue, ResourceDescriptor, ResourceRef, SecretRef};
use crate::group::CompositeGroup;

/// Parameters of a warehouse cluster.
#[derive(Debug, Clone)]
pub struct WarehouseSpec {
    /// Master user name.
    pub master_username: String,
    /// Name of the secret holding the master user password.
    pub master_password_secret: String,
    /// Database name.
    pub database: String,
    /// Node type, e.g. `dc2.large`.
    pub node_type: String,
    /// Whether the cluster spans several nodes.
    pub multi_node: bool,
    /// Listener port.
    pub port: u16,
    /// Parameter path prefix for connection details.
    pub parameter_prefix: String,
}

/// Identifier of the cluster descriptor.
pub const CLUSTER_ID: &str = "redshift-cluster";

/// Identifier of the access role descriptor.
pub const ROLE_ID: &str = "redshift-role";

/// Builds the warehouse groups: `networking`, `cluster`, and `parameters`.
///
/// # Errors
///
/// Returns an error if a descriptor is invalid.
pub fn redshift_group(spec: &WarehouseSpec) -> Result<Vec<CompositeGroup>> {
    let networking = CompositeGroup::new("networking")
        .with(vpc("redshift-vpc", &VpcSpec::default())?)
        .with(security_group(
            "redshift-sg",
            Link::local("redshift-vpc", "vpcId"),
            "Warehouse access",
            &[Ingress::any_ipv4(spec.port, "Allow Redshift access")],
        )?);

    let role = ResourceDescriptor::builder(ResourceKind::Role, ROLE_ID)
        .text("assumedBy", "redshift.amazonaws.com")
        .list(
            "managedPolicies",
            vec![ConfigValue::from("AmazonS3ReadOnlyAccess")],
        )
        .build()?;

    let cluster = ResourceDescriptor::builder(ResourceKind::DataWarehouse, CLUSTER_ID)
        .text("masterUsername", spec.master_username.as_str())
        .secret(
            "masterUserPassword",
            spec.master_password_secret.as_str(),
            None,
        )
        .text("databaseName", spec.database.as_str())
        .text("nodeType", spec.node_type.as_str())
        .text(
            "clusterType",
            if spec.multi_node { "multi-node" } else { "single-node" },
        )
        .number("port", i64::from(spec.port))
        .list(
            "iamRoles",
            vec![ResourceRef::attr(ROLE_ID, "roleArn").into()],
        )
        .list(
            "vpcSecurityGroupIds",
            vec![ResourceRef::attr("redshift-sg", "securityGroupId").into()],
        )
        .attribute("subnets", "redshift-vpc", "publicSubnetIds")
        .build()?;

    let parameters = parameter_group(
        &spec.parameter_prefix,
        vec![
            (
                "redshift-endpoint-param",
                "cluster-endpoint",
                ResourceRef::attr(CLUSTER_ID, "endpointAddress").into(),
            ),
            (
                "redshift-database-param",
                "database",
                spec.database.as_str().into(),
            ),
            (
                "redshift-user-param",
                "user",
                spec.master_username.as_str().into(),
            ),
            (
                "redshift-password-param",
                "password",
                ConfigValue::Secret(SecretRef::named(spec.master_password_secret.as_str())),
            ),
            (
                "redshift-port-param",
                "port",
                spec.port.to_string().into(),
            ),
            (
                "redshift-role-param",
                "role",
                ResourceRef::attr(ROLE_ID, "roleArn").into(),
            ),
        ],
    )?;

    Ok(vec![
        networking,
        CompositeGroup::new("cluster").with(role).with(cluster),
        parameters,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> WarehouseSpec {
        WarehouseSpec {
            master_username: "admin".into(),
            master_password_secret: "REDSHIFT_MASTER_PASSWORD".into(),
            database: "lake".into(),
            node_type: "dc2.large".into(),
            multi_node: false,
            port: 5439,
            parameter_prefix: "/analytics/redshift".into(),
        }
    }

    #[test]
    fn warehouse_groups_are_complete() {
        let groups = redshift_group(&spec()).expect("valid");
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["networking", "cluster", "parameters"]);
        assert_eq!(groups[2].resources.len(), 6);
    }

    #[test]
    fn endpoint_parameter_depends_on_cluster() {
        let groups = redshift_group(&spec()).expect("valid");
        let endpoint = &groups[2].resources[0];
        assert!(
            endpoint
                .depends_on()
                .iter()
                .any(|id| id.as_str() == CLUSTER_ID)
        );
    }

    #[test]
    fn missing_node_type_is_rejected() {
        let mut bad = spec();
        bad.node_type.clear();
        let err = redshift_group(&bad).unwrap_err();
        assert!(err.to_string().contains("`nodeType`"), "got: {err}");
    }

    #[test]
    fn password_is_a_secret_reference() {
        let groups = redshift_group(&spec()).expect("valid");
        let cluster = &groups[1].resources[1];
        assert!(matches!(
            cluster.get("masterUserPassword"),
            Some(ConfigValue::Secret(s)) if s.name == "REDSHIFT_MASTER_PASSWORD"
        ));
        let password = &groups[2].resources[3];
        assert_eq!(
            password.get("type").and_then(ConfigValue::as_text),
            Some("SecureString")
        );
    }
}
