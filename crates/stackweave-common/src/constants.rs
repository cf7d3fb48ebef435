//! System-wide constants: environment variable names and defaults.

/// Account the stacks are deployed into.
pub const ENV_ACCOUNT: &str = "CDK_DEFAULT_ACCOUNT";
/// Region the stacks are deployed into.
pub const ENV_REGION: &str = "CDK_DEFAULT_REGION";
/// Log level passed to provisioned servers.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Public SSH key installed on provisioned servers.
pub const ENV_SSH_PUB_KEY: &str = "SSH_PUB_KEY";
/// Processor architecture of provisioned servers.
pub const ENV_CPU_TYPE: &str = "CPU_TYPE";
/// Size class of provisioned servers.
pub const ENV_INSTANCE_SIZE: &str = "INSTANCE_SIZE";
/// Hosted zone domain.
pub const ENV_DOMAIN_NAME: &str = "DOMAIN_NAME";
/// Fully qualified name of the API endpoint.
pub const ENV_API_SUBDOMAIN: &str = "API_SUBDOMAIN";
/// Fully qualified name of the web application endpoint.
pub const ENV_WEBAPP_SUBDOMAIN: &str = "WEBAPP_SUBDOMAIN";
/// Data lake bucket name.
pub const ENV_BUCKET_NAME: &str = "BUCKET_NAME";
/// Owner of the source repositories.
pub const ENV_GITHUB_USERNAME: &str = "GITHUB_USERNAME";
/// API source repository.
pub const ENV_REPOSITORY_FASTAPI: &str = "REPOSITORY_FASTAPI";
/// Web application source repository.
pub const ENV_REPOSITORY_NEXT_WEBAPP: &str = "REPOSITORY_NEXT_WEBAPP";
/// Database connection string stored as a parameter.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Token signing secret stored as a parameter.
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
/// Application environment label stored as a parameter.
pub const ENV_APP_ENV: &str = "APP_ENV";

/// Warehouse master user.
pub const ENV_REDSHIFT_MASTER_USERNAME: &str = "REDSHIFT_MASTER_USERNAME";
/// Warehouse master password.
pub const ENV_REDSHIFT_MASTER_PASSWORD: &str = "REDSHIFT_MASTER_PASSWORD";
/// Warehouse database name.
pub const ENV_REDSHIFT_DATABASE: &str = "REDSHIFT_DATABASE";
/// Warehouse node type.
pub const ENV_REDSHIFT_NODE_TYPE: &str = "REDSHIFT_NODE_TYPE";
/// Warehouse cluster type (`single-node` or `multi-node`).
pub const ENV_REDSHIFT_CLUSTER_TYPE: &str = "REDSHIFT_CLUSTER_TYPE";
/// Warehouse port.
pub const ENV_REDSHIFT_PORT: &str = "REDSHIFT_PORT";

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";
/// Server log level used when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
/// Warehouse port used when none is configured.
pub const DEFAULT_REDSHIFT_PORT: u16 = 5439;

/// Environment file read before the process environment.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Default output directory for synthesized templates.
pub const DEFAULT_OUT_DIR: &str = "cdk.out";

/// Scope name used for the inter-stack dependency graph.
pub const APP_SCOPE: &str = "app";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "swv";
