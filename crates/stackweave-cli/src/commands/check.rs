//! `swv check`: Report every configuration issue.

use std::path::Path;

use clap::Args;
use stackweave_common::config::{DeploymentConfig, load_env_map};

use crate::output::{BOLD, GREEN, RED, RESET};

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {}

/// Executes the `check` command.
///
/// Unlike the other commands, which stop at the first configuration
/// problem, this lists all of them.
///
/// # Errors
///
/// Returns an error if the environment file cannot be parsed or any
/// configuration issue is found.
pub fn execute(_args: &CheckArgs, env_file: &Path) -> anyhow::Result<()> {
    let vars = load_env_map(env_file)?;
    let issues = DeploymentConfig::issues(&vars);

    if issues.is_empty() {
        println!("  {GREEN}\u{2713}{RESET} configuration is complete");
        return Ok(());
    }

    println!("  {BOLD}Configuration issues:{RESET}");
    for issue in &issues {
        println!("    {RED}\u{2717}{RESET} {issue}");
    }
    anyhow::bail!("{} configuration issue(s) found", issues.len())
}
