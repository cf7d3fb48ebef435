//! The reference web application: a data lake bucket, an API server and a
//! web application server behind load balancers, their delivery pipelines,
//! DNS records, and an optional data warehouse.
//!
//! Stacks are declared in [`reference_stacks`] order, which is also the
//! tie-break order between independent stacks.

use stackweave_common::config::{DeploymentConfig, RedshiftConfig};
use stackweave_common::constants::{
    ENV_DATABASE_URL, ENV_JWT_SECRET, ENV_REDSHIFT_MASTER_PASSWORD,
};
use stackweave_common::error::Result;
use stackweave_compose::construct::Link;
use stackweave_compose::construct::certificate::certificate;
use stackweave_compose::construct::compute::{Runtime, ServerSpec, server};
use stackweave_compose::construct::data_warehouse::{WarehouseSpec, redshift_group};
use stackweave_compose::construct::dns::alias_record;
use stackweave_compose::construct::load_balancer::alb;
use stackweave_compose::construct::network::{VpcSpec, networking};
use stackweave_compose::construct::object_store::data_lake_bucket;
use stackweave_compose::construct::parameters::parameter_group;
use stackweave_compose::construct::pipeline::{PipelineSpec, code_deploy_pipeline};
use stackweave_compose::descriptor::{ConfigValue, OutputRef, SecretRef};
use stackweave_compose::group::CompositeGroup;
use stackweave_compose::stack::Stack;

use crate::app::App;
use crate::builder::StackBuilder;

/// Data lake bucket stack.
pub const S3_BUCKET_STACK: &str = "S3BucketStack";
/// API server stack; also owns the shared network and certificates.
pub const FASTAPI_APP_STACK: &str = "FastApiAppStack";
/// API delivery pipeline stack.
pub const CICD_FASTAPI_STACK: &str = "CICDFastApiStack";
/// Web application server stack.
pub const NEXTJS_APP_STACK: &str = "NextJsAppStack";
/// Web application delivery pipeline stack.
pub const CICD_NEXTJS_STACK: &str = "CICDNextJsStack";
/// DNS records stack.
pub const ROUTE53_STACK: &str = "Route53Stack";
/// Optional data warehouse stack.
pub const REDSHIFT_STACK: &str = "RedshiftStack";

/// Parameter path prefix of the API configuration.
pub const API_PARAMETER_PREFIX: &str = "/my-fastapi-app";
/// Parameter path prefix of the warehouse connection details.
pub const REDSHIFT_PARAMETER_PREFIX: &str = "/techchallenge/redshift";

const API_TAG: (&str, &str) = ("Group", "FastApiServer");
const WEB_TAG: (&str, &str) = ("Group", "NextJsServer");

/// Declares every stack of the reference application.
///
/// The warehouse stack is included only when `config.redshift` is set; the
/// bucket stack then depends on it, so it is provisioned first.
///
/// # Errors
///
/// Returns the first invalid descriptor or output.
pub fn reference_stacks(config: &DeploymentConfig) -> Result<Vec<Stack>> {
    let mut stacks = vec![
        s3_bucket_stack(config, config.redshift.is_some())?,
        fastapi_app_stack(config)?,
        cicd_stack(
            config,
            CICD_FASTAPI_STACK,
            FASTAPI_APP_STACK,
            ("fastapi", "FastApi"),
            &config.repository_fastapi,
            API_TAG,
        )?,
        nextjs_app_stack(config)?,
        cicd_stack(
            config,
            CICD_NEXTJS_STACK,
            NEXTJS_APP_STACK,
            ("nextjs", "NextJs"),
            &config.repository_next_webapp,
            WEB_TAG,
        )?,
        route53_stack(config)?,
    ];
    if let Some(redshift) = &config.redshift {
        stacks.push(redshift_stack(config, redshift)?);
    }
    tracing::info!(stacks = stacks.len(), "declared reference application");
    Ok(stacks)
}

/// The reference application as an [`App`].
///
/// # Errors
///
/// As [`reference_stacks`].
pub fn reference_app(config: &DeploymentConfig) -> Result<App> {
    Ok(reference_stacks(config)?.into_iter().collect())
}

fn s3_bucket_stack(config: &DeploymentConfig, with_warehouse: bool) -> Result<Stack> {
    let mut builder = StackBuilder::new(S3_BUCKET_STACK, config.environment.clone());
    if with_warehouse {
        builder = builder.depends_on(REDSHIFT_STACK);
    }
    builder
        .group(data_lake_bucket("data-lake", &config.bucket_name)?)
        .described_output("BucketName", "${data-lake}", "Data lake bucket name")
        .build()
}

fn fastapi_app_stack(config: &DeploymentConfig) -> Result<Stack> {
    let vpc = Link::local("vpc", "vpcId");
    let certificates = CompositeGroup::new("certificates")
        .with(certificate(
            "api-cert",
            &config.api_subdomain,
            &config.domain_name,
        )?)
        .with(certificate(
            "webapp-cert",
            &config.webapp_subdomain,
            &config.domain_name,
        )?);

    let parameters = parameter_group(
        API_PARAMETER_PREFIX,
        vec![
            (
                "database-url-param",
                "DATABASE_URL",
                ConfigValue::Secret(SecretRef::named(ENV_DATABASE_URL)),
            ),
            (
                "jwt-secret-param",
                "JWT_SECRET",
                ConfigValue::Secret(SecretRef::named(ENV_JWT_SECRET)),
            ),
            (
                "bucket-name-param",
                "BUCKET_NAME",
                ConfigValue::Import(OutputRef::new(S3_BUCKET_STACK, "BucketName")),
            ),
            ("env-param", "ENV", config.app_env.as_str().into()),
        ],
    )?;

    StackBuilder::new(FASTAPI_APP_STACK, config.environment.clone())
        .depends_on(S3_BUCKET_STACK)
        .group(networking("vpc", "ssh-sg", &VpcSpec::default())?)
        .group(certificates)
        .group(server(&server_spec(
            config,
            "api-server",
            vpc.clone(),
            Link::local("ssh-sg", "securityGroupId"),
            Runtime::Python,
            API_TAG,
        ))?)
        .group(alb(
            "api-alb",
            &vpc,
            "api-server",
            Link::local("api-cert", "certificateArn"),
        )?)
        .group(parameters)
        .described_output(
            "ssmCommand",
            "aws ssm start-session --target ${api-server.instanceId}",
            "Start a session on the API server",
        )
        .described_output(
            "sshCommand",
            "ssh ec2-user@${api-server.publicDnsName}",
            "Connect to the API server",
        )
        .output("VpcId", "${vpc.vpcId}")
        .output("SshSecurityGroupId", "${ssh-sg.securityGroupId}")
        .output("WebAppCertificateArn", "${webapp-cert.certificateArn}")
        .output("ApiLoadBalancerDnsName", "${api-alb.dnsName}")
        .build()
}

fn nextjs_app_stack(config: &DeploymentConfig) -> Result<Stack> {
    let vpc = Link::imported(FASTAPI_APP_STACK, "VpcId");

    StackBuilder::new(NEXTJS_APP_STACK, config.environment.clone())
        .depends_on(FASTAPI_APP_STACK)
        .group(server(&server_spec(
            config,
            "web-server",
            vpc.clone(),
            Link::imported(FASTAPI_APP_STACK, "SshSecurityGroupId"),
            Runtime::NodeJs,
            WEB_TAG,
        ))?)
        .group(alb(
            "web-alb",
            &vpc,
            "web-server",
            Link::imported(FASTAPI_APP_STACK, "WebAppCertificateArn"),
        )?)
        .described_output(
            "ssmCommand",
            "aws ssm start-session --target ${web-server.instanceId}",
            "Start a session on the web application server",
        )
        .described_output(
            "sshCommand",
            "ssh ec2-user@${web-server.publicDnsName}",
            "Connect to the web application server",
        )
        .output("WebLoadBalancerDnsName", "${web-alb.dnsName}")
        .build()
}

fn cicd_stack(
    config: &DeploymentConfig,
    name: &str,
    app_stack: &str,
    (id, label): (&str, &str),
    repository: &str,
    tag: (&str, &str),
) -> Result<Stack> {
    let pipeline = code_deploy_pipeline(&PipelineSpec {
        id: id.to_owned(),
        name: label.to_owned(),
        owner: config.github_username.clone(),
        repository: repository.to_owned(),
        branch: "main".to_owned(),
        instance_tag: (tag.0.to_owned(), tag.1.to_owned()),
    })?;

    StackBuilder::new(name, config.environment.clone())
        .depends_on(app_stack)
        .group(pipeline)
        .output("PipelineName", format!("${{{id}-pipeline}}"))
        .build()
}

fn route53_stack(config: &DeploymentConfig) -> Result<Stack> {
    let records = CompositeGroup::new("dns")
        .with(alias_record(
            "api-record",
            &config.domain_name,
            &config.api_subdomain,
            Link::imported(FASTAPI_APP_STACK, "ApiLoadBalancerDnsName"),
        )?)
        .with(alias_record(
            "webapp-record",
            &config.domain_name,
            &config.webapp_subdomain,
            Link::imported(NEXTJS_APP_STACK, "WebLoadBalancerDnsName"),
        )?);

    StackBuilder::new(ROUTE53_STACK, config.environment.clone())
        .depends_on(NEXTJS_APP_STACK)
        .depends_on(FASTAPI_APP_STACK)
        .group(records)
        .output("ApiUrl", format!("https://{}", config.api_subdomain))
        .output("WebAppUrl", format!("https://{}", config.webapp_subdomain))
        .build()
}

fn redshift_stack(config: &DeploymentConfig, redshift: &RedshiftConfig) -> Result<Stack> {
    let groups = redshift_group(&WarehouseSpec {
        master_username: redshift.master_username.clone(),
        master_password_secret: ENV_REDSHIFT_MASTER_PASSWORD.to_owned(),
        database: redshift.database.clone(),
        node_type: redshift.node_type.clone(),
        multi_node: redshift.multi_node,
        port: redshift.port,
        parameter_prefix: REDSHIFT_PARAMETER_PREFIX.to_owned(),
    })?;

    StackBuilder::new(REDSHIFT_STACK, config.environment.clone())
        .groups(groups)
        .described_output(
            "ClusterEndpoint",
            "${redshift-cluster.endpointAddress}",
            "Warehouse endpoint address",
        )
        .output("ClusterName", "${redshift-cluster}")
        .output("RoleArn", "${redshift-role.roleArn}")
        .build()
}

fn server_spec(
    config: &DeploymentConfig,
    id: &str,
    vpc: Link,
    ssh_security_group: Link,
    runtime: Runtime,
    tag: (&str, &str),
) -> ServerSpec {
    ServerSpec {
        id: id.to_owned(),
        vpc,
        ssh_security_group,
        cpu_type: config.cpu_type,
        instance_size: config.instance_size,
        log_level: config.log_level.clone(),
        ssh_pub_key: config.ssh_pub_key.clone(),
        runtime,
        deploy_tag: (tag.0.to_owned(), tag.1.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use stackweave_common::types::StackName;

    use super::*;

    fn config(redshift: bool) -> DeploymentConfig {
        let mut vars: BTreeMap<String, String> = [
            ("CDK_DEFAULT_ACCOUNT", "123456789012"),
            ("DOMAIN_NAME", "example.com"),
            ("API_SUBDOMAIN", "api.example.com"),
            ("WEBAPP_SUBDOMAIN", "app.example.com"),
            ("BUCKET_NAME", "example-lake"),
            ("GITHUB_USERNAME", "octo"),
            ("REPOSITORY_FASTAPI", "api"),
            ("REPOSITORY_NEXT_WEBAPP", "web"),
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", "s3cret"),
            ("APP_ENV", "dev"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        if redshift {
            for (k, v) in [
                ("REDSHIFT_MASTER_USERNAME", "admin"),
                ("REDSHIFT_MASTER_PASSWORD", "pw"),
                ("REDSHIFT_DATABASE", "lake"),
                ("REDSHIFT_NODE_TYPE", "dc2.large"),
            ] {
                let _ = vars.insert(k.to_owned(), v.to_owned());
            }
        }
        DeploymentConfig::from_env_map(&vars).expect("config")
    }

    #[test]
    fn six_stacks_resolve_in_reference_order() {
        let app = reference_app(&config(false)).expect("app");
        let resolved = app.resolve().expect("resolve");
        let order: Vec<&str> = resolved.order().iter().map(|n| n.as_str()).collect();
        assert_eq!(
            order,
            vec![
                S3_BUCKET_STACK,
                FASTAPI_APP_STACK,
                CICD_FASTAPI_STACK,
                NEXTJS_APP_STACK,
                CICD_NEXTJS_STACK,
                ROUTE53_STACK,
            ]
        );
    }

    #[test]
    fn warehouse_stack_is_optional() {
        let stacks = reference_stacks(&config(true)).expect("stacks");
        assert_eq!(stacks.len(), 7);
        let warehouse = stacks.last().expect("warehouse");
        assert_eq!(warehouse.name(), &StackName::new(REDSHIFT_STACK));
        assert!(warehouse.dependencies().is_empty());
        assert_eq!(stacks[0].dependencies(), &[StackName::new(REDSHIFT_STACK)]);
        assert!(reference_stacks(&config(false)).expect("stacks")[0]
            .dependencies()
            .is_empty());
    }

    #[test]
    fn warehouse_is_provisioned_before_bucket() {
        let app = reference_app(&config(true)).expect("app");
        let resolved = app.resolve().expect("resolve");
        let order: Vec<&str> = resolved.order().iter().map(|n| n.as_str()).collect();
        assert_eq!(order[0], REDSHIFT_STACK);
        assert_eq!(order[1], S3_BUCKET_STACK);
    }

    #[test]
    fn warehouse_exports_cluster_name() {
        let stacks = reference_stacks(&config(true)).expect("stacks");
        let keys: Vec<&str> = stacks[6].outputs().iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["ClusterEndpoint", "ClusterName", "RoleArn"]);
    }

    #[test]
    fn api_parameters_reference_secrets() {
        let stacks = reference_stacks(&config(false)).expect("stacks");
        let json = serde_json::to_string(&stacks[1]).expect("json");
        assert!(!json.contains("postgres://db"));
        assert!(!json.contains("s3cret"));
        let jwt = stacks[1]
            .resources()
            .find(|r| r.id().as_str() == "jwt-secret-param")
            .expect("jwt parameter");
        assert_eq!(jwt.get("type").and_then(ConfigValue::as_text), Some("SecureString"));
    }

    #[test]
    fn api_servers_derive_instance_type() {
        let stacks = reference_stacks(&config(false)).expect("stacks");
        let api = stacks[1]
            .resources()
            .find(|r| r.id().as_str() == "api-server")
            .expect("api server");
        assert_eq!(api.get("instanceType").and_then(ConfigValue::as_text), Some("t3.micro"));
    }

    #[test]
    fn web_stack_imports_shared_network() {
        let stacks = reference_stacks(&config(false)).expect("stacks");
        let imports: Vec<String> = stacks[3].imports().iter().map(ToString::to_string).collect();
        assert!(imports.contains(&"FastApiAppStack:VpcId".to_string()));
        assert!(imports.contains(&"FastApiAppStack:WebAppCertificateArn".to_string()));
    }
}
