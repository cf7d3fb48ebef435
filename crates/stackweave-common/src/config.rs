//! Deployment configuration derived from environment variables.
//!
//! All environment-derived values are read and validated here, in one
//! place, before any stack is declared. Graph construction receives the
//! resulting [`DeploymentConfig`] explicitly.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants as c;
use crate::error::{Result, StackweaveError};
use crate::types::{CpuType, Environment, InstanceSize};

/// Root configuration for declaring the application's stacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Account and region shared by every stack.
    pub environment: Environment,
    /// Log level passed to provisioned servers.
    pub log_level: String,
    /// Public SSH key installed on provisioned servers.
    pub ssh_pub_key: Option<String>,
    /// Processor architecture of provisioned servers.
    pub cpu_type: CpuType,
    /// Size class of provisioned servers.
    pub instance_size: InstanceSize,
    /// Hosted zone domain.
    pub domain_name: String,
    /// Fully qualified API endpoint name.
    pub api_subdomain: String,
    /// Fully qualified web application endpoint name.
    pub webapp_subdomain: String,
    /// Data lake bucket name.
    pub bucket_name: String,
    /// Owner of the source repositories.
    pub github_username: String,
    /// API source repository.
    pub repository_fastapi: String,
    /// Web application source repository.
    pub repository_next_webapp: String,
    /// Database connection string.
    pub database_url: String,
    /// Token signing secret.
    pub jwt_secret: String,
    /// Application environment label.
    pub app_env: String,
    /// Optional data warehouse settings.
    pub redshift: Option<RedshiftConfig>,
}

/// Data warehouse settings, present only when any `REDSHIFT_*` variable is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedshiftConfig {
    /// Master user name.
    pub master_username: String,
    /// Master user password.
    pub master_password: String,
    /// Database name.
    pub database: String,
    /// Node type, e.g. `dc2.large`.
    pub node_type: String,
    /// Whether the cluster spans several nodes.
    pub multi_node: bool,
    /// Listener port.
    pub port: u16,
}

impl DeploymentConfig {
    /// Builds the configuration from an environment variable map.
    ///
    /// # Errors
    ///
    /// Returns the first [`StackweaveError::Validation`] found, naming the
    /// offending variable.
    pub fn from_env_map(vars: &BTreeMap<String, String>) -> Result<Self> {
        let (config, issues) = Self::load(vars);
        match issues.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(config),
        }
    }

    /// Builds the configuration from `dotenv_path` and the current process
    /// environment, the latter taking precedence.
    ///
    /// # Errors
    ///
    /// As [`load_env_map`] and [`Self::from_env_map`].
    pub fn from_env_file(dotenv_path: &Path) -> Result<Self> {
        Self::from_env_map(&load_env_map(dotenv_path)?)
    }

    /// Values the provisioning engine supplies for secret references,
    /// keyed by secret name.
    #[must_use]
    pub fn secrets(&self) -> BTreeMap<String, String> {
        let mut secrets = BTreeMap::from([
            (c::ENV_DATABASE_URL.to_owned(), self.database_url.clone()),
            (c::ENV_JWT_SECRET.to_owned(), self.jwt_secret.clone()),
        ]);
        if let Some(redshift) = &self.redshift {
            let _ = secrets.insert(
                c::ENV_REDSHIFT_MASTER_PASSWORD.to_owned(),
                redshift.master_password.clone(),
            );
        }
        secrets
    }

    /// Returns every validation issue in `vars`, in a stable order.
    #[must_use]
    pub fn issues(vars: &BTreeMap<String, String>) -> Vec<StackweaveError> {
        Self::load(vars).1
    }

    fn load(vars: &BTreeMap<String, String>) -> (Self, Vec<StackweaveError>) {
        let mut env = EnvReader::new(vars);

        let account = env.required(c::ENV_ACCOUNT);
        let region = env.or_default(c::ENV_REGION, c::DEFAULT_REGION);
        let config = Self {
            environment: Environment::new(account, region),
            log_level: env.or_default(c::ENV_LOG_LEVEL, c::DEFAULT_LOG_LEVEL),
            ssh_pub_key: env.optional(c::ENV_SSH_PUB_KEY),
            cpu_type: env.parsed(c::ENV_CPU_TYPE, CpuType::X86_64),
            instance_size: env.parsed(c::ENV_INSTANCE_SIZE, InstanceSize::Micro),
            domain_name: env.required(c::ENV_DOMAIN_NAME),
            api_subdomain: env.required(c::ENV_API_SUBDOMAIN),
            webapp_subdomain: env.required(c::ENV_WEBAPP_SUBDOMAIN),
            bucket_name: env.required(c::ENV_BUCKET_NAME),
            github_username: env.required(c::ENV_GITHUB_USERNAME),
            repository_fastapi: env.required(c::ENV_REPOSITORY_FASTAPI),
            repository_next_webapp: env.required(c::ENV_REPOSITORY_NEXT_WEBAPP),
            database_url: env.required(c::ENV_DATABASE_URL),
            jwt_secret: env.required(c::ENV_JWT_SECRET),
            app_env: env.required(c::ENV_APP_ENV),
            redshift: RedshiftConfig::load(&mut env),
        };

        tracing::debug!(issues = env.issues.len(), "loaded deployment configuration");
        (config, env.issues)
    }
}

impl RedshiftConfig {
    const VARS: [&'static str; 6] = [
        c::ENV_REDSHIFT_MASTER_USERNAME,
        c::ENV_REDSHIFT_MASTER_PASSWORD,
        c::ENV_REDSHIFT_DATABASE,
        c::ENV_REDSHIFT_NODE_TYPE,
        c::ENV_REDSHIFT_CLUSTER_TYPE,
        c::ENV_REDSHIFT_PORT,
    ];

    fn load(env: &mut EnvReader<'_>) -> Option<Self> {
        if !Self::VARS.iter().any(|name| env.optional(name).is_some()) {
            return None;
        }

        let multi_node = match env.optional(c::ENV_REDSHIFT_CLUSTER_TYPE).as_deref() {
            None | Some("single-node") => false,
            Some("multi-node") => true,
            Some(other) => {
                env.issues.push(StackweaveError::validation(
                    "environment",
                    c::ENV_REDSHIFT_CLUSTER_TYPE,
                    format!("must be single-node or multi-node, got \"{other}\""),
                ));
                false
            }
        };
        let port = match env.optional(c::ENV_REDSHIFT_PORT) {
            None => c::DEFAULT_REDSHIFT_PORT,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                env.issues.push(StackweaveError::validation(
                    "environment",
                    c::ENV_REDSHIFT_PORT,
                    format!("is not a valid port: \"{raw}\""),
                ));
                c::DEFAULT_REDSHIFT_PORT
            }),
        };

        Some(Self {
            master_username: env.required(c::ENV_REDSHIFT_MASTER_USERNAME),
            master_password: env.required(c::ENV_REDSHIFT_MASTER_PASSWORD),
            database: env.required(c::ENV_REDSHIFT_DATABASE),
            node_type: env.required(c::ENV_REDSHIFT_NODE_TYPE),
            multi_node,
            port,
        })
    }
}

/// Collects variables from `dotenv_path`, if it exists, overlaid by the
/// process environment.
///
/// # Errors
///
/// Returns [`StackweaveError::EnvFile`] if the file exists but cannot be
/// parsed.
pub fn load_env_map(dotenv_path: &Path) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    if dotenv_path.is_file() {
        let env_file_error = |source| StackweaveError::EnvFile {
            path: dotenv_path.to_path_buf(),
            source,
        };
        for entry in dotenv::from_path_iter(dotenv_path).map_err(env_file_error)? {
            let (key, value) = entry.map_err(env_file_error)?;
            let _ = vars.insert(key, value);
        }
        tracing::debug!(path = %dotenv_path.display(), vars = vars.len(), "read environment file");
    }
    vars.extend(std::env::vars());
    Ok(vars)
}

/// Reads variables and accumulates validation issues instead of stopping
/// at the first one.
struct EnvReader<'a> {
    vars: &'a BTreeMap<String, String>,
    issues: Vec<StackweaveError>,
}

impl<'a> EnvReader<'a> {
    const fn new(vars: &'a BTreeMap<String, String>) -> Self {
        Self {
            vars,
            issues: Vec::new(),
        }
    }

    /// Blank values count as absent.
    fn optional(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
    }

    fn required(&mut self, name: &str) -> String {
        self.optional(name).unwrap_or_else(|| {
            self.issues.push(StackweaveError::missing("environment", name));
            String::new()
        })
    }

    fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_owned())
    }

    fn parsed<T>(&mut self, name: &str, default: T) -> T
    where
        T: FromStr<Err = StackweaveError>,
    {
        match self.optional(name) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                self.issues.push(e);
                default
            }),
        }
    }
}
