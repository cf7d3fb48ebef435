//! `swv deploy`: Provision the application through the dry-run engine.

use std::path::Path;

use clap::Args;
use stackweave_sdk::deployer::Deployer;
use stackweave_sdk::engine::DryRunEngine;
use stackweave_sdk::event::{DeploymentEvent, EventListener};

use crate::output::{BOLD, RED, RESET, YELLOW, format_event, format_outputs};

/// Arguments for the `deploy` command.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Use the in-process dry-run engine. Required: no other engine is bundled.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the resolved outputs as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `deploy` command.
///
/// # Errors
///
/// Returns an error if `--dry-run` is missing, or if resolution or any
/// stack's provisioning fails.
pub fn execute(args: &DeployArgs, env_file: &Path) -> anyhow::Result<()> {
    if !args.dry_run {
        anyhow::bail!("no provisioning engine is bundled; rerun with --dry-run");
    }

    let (config, app) = super::load_app(env_file)?;
    let listener = EventListener::with_callback(|event| {
        let line = format_event(event);
        if matches!(event, DeploymentEvent::StackFailed { .. }) {
            eprintln!("  {RED}{line}{RESET}");
        } else {
            eprintln!("  {line}");
        }
    });
    let mut deployer = Deployer::with_listener(DryRunEngine::with_secrets(config.secrets()), listener);

    eprintln!("  {YELLOW}Dry run:{RESET} no resources are created.");
    let emitter = deployer.deploy(&app)?;
    let outputs = emitter.operator_outputs();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
        return Ok(());
    }

    println!();
    println!("  {BOLD}Outputs{RESET}");
    for line in format_outputs(&outputs) {
        println!("    {line}");
    }
    Ok(())
}
