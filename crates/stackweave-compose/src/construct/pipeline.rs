//! Delivery pipeline construct: repository source to instance deployment.

use stackweave_common::error::Result;
use stackweave_common::types::ResourceKind;

use crate::descriptor::{ConfigValue, ResourceDescriptor};
use crate::group::CompositeGroup;

/// Secret holding the repository access token.
pub const SOURCE_TOKEN_SECRET: &str = "github-token";

/// Parameters of a source-to-deploy pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSpec {
    /// Prefix for descriptor identifiers.
    pub id: String,
    /// Name shared by the application, deployment group, and pipeline.
    pub name: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repository: String,
    /// Branch that triggers the pipeline.
    pub branch: String,
    /// Instance tag selecting deployment targets, as `key=value`.
    pub instance_tag: (String, String),
}

/// Builds the `delivery` group: a deployment application, a deployment
/// group selecting instances by tag, and a two-stage pipeline (source,
/// deploy) whose token is read from [`SOURCE_TOKEN_SECRET`].
///
/// # Errors
///
/// Returns a validation error if the owner, repository, or branch is blank.
pub fn code_deploy_pipeline(spec: &PipelineSpec) -> Result<CompositeGroup> {
    let app_id = format!("{}-app", spec.id);
    let group_id = format!("{}-deployment-group", spec.id);
    let pipeline_id = format!("{}-pipeline", spec.id);

    let application = ResourceDescriptor::builder(ResourceKind::Deployment, app_id.as_str())
        .text("applicationName", format!("{}App", spec.name))
        .text("computePlatform", "Server")
        .build()?;

    let deployment_group =
        ResourceDescriptor::builder(ResourceKind::Deployment, group_id.as_str())
            .attribute("applicationName", app_id.as_str(), "applicationName")
            .text("deploymentGroupName", format!("{}DeploymentGroup", spec.name))
            .list(
                "ec2InstanceTags",
                vec![ConfigValue::Text(format!(
                    "{}={}",
                    spec.instance_tag.0, spec.instance_tag.1
                ))],
            )
            .build()?;

    let pipeline = ResourceDescriptor::builder(ResourceKind::Pipeline, pipeline_id.as_str())
        .text("pipelineName", format!("{}Pipeline", spec.name))
        .text("owner", spec.owner.as_str())
        .text("repository", spec.repository.as_str())
        .text("branch", spec.branch.as_str())
        .secret("oauthToken", SOURCE_TOKEN_SECRET, Some("token"))
        .list(
            "stages",
            vec![
                ConfigValue::from("Source: GitHub_Source"),
                ConfigValue::from("Deploy: CodeDeploy"),
            ],
        )
        .reference("deploymentGroup", group_id.as_str())
        .list(
            "rolePolicy",
            vec![
                ConfigValue::from("codedeploy:*"),
                ConfigValue::from("s3:*"),
                ConfigValue::from("iam:PassRole"),
            ],
        )
        .build()?;

    Ok(CompositeGroup::new("delivery")
        .with(application)
        .with(deployment_group)
        .with(pipeline))
}
