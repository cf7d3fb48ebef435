//! CLI command definitions and dispatch.

pub mod check;
pub mod deploy;
pub mod outputs;
pub mod plan;
pub mod synth;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use stackweave_common::config::DeploymentConfig;
use stackweave_common::constants::{BIN_NAME, DEFAULT_ENV_FILE};
use stackweave_sdk::app::App;
use stackweave_sdk::topology;

/// Stackweave: declarative infrastructure graphs with deterministic ordering.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "SWV_LOG_JSON")]
    pub log_json: bool,

    /// Environment file read before the process environment.
    #[arg(long, global = true, env = "SWV_ENV_FILE", default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report every configuration issue in the environment.
    Check(check::CheckArgs),
    /// Display the emission order and each stack's resources.
    Plan(plan::PlanArgs),
    /// Write one template per stack.
    Synth(synth::SynthArgs),
    /// Provision the application through the dry-run engine.
    Deploy(deploy::DeployArgs),
    /// List declared outputs and their export names.
    Outputs(outputs::OutputsArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let env_file = cli.env_file.as_path();
    match cli.command {
        Command::Check(args) => check::execute(&args, env_file),
        Command::Plan(args) => plan::execute(&args, env_file),
        Command::Synth(args) => synth::execute(&args, env_file),
        Command::Deploy(args) => deploy::execute(&args, env_file),
        Command::Outputs(args) => outputs::execute(&args, env_file),
    }
}

/// Loads configuration from `env_file` and the process environment and
/// declares the reference application.
fn load_app(env_file: &Path) -> anyhow::Result<(DeploymentConfig, App)> {
    let config = DeploymentConfig::from_env_file(env_file)?;
    tracing::debug!(environment = %config.environment, "configuration loaded");
    let app = topology::reference_app(&config)?;
    Ok((config, app))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_named_after_binary() {
        let command = Cli::command();
        command.clone().debug_assert();
        assert_eq!(command.get_name(), BIN_NAME);
    }

    #[test]
    fn env_file_is_global() {
        let cli = Cli::try_parse_from([BIN_NAME, "check", "--env-file", "deploy.env"])
            .expect("parse");
        assert_eq!(cli.env_file, PathBuf::from("deploy.env"));
    }
}
