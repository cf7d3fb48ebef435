//! `swv plan`: Display the emission order and each stack's resources.

use std::path::Path;

use clap::Args;
use stackweave_compose::resolver::ResolvedStack;

use crate::output::{BOLD, DIM, RESET, rule};

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Show only the named stack.
    #[arg(long)]
    pub only: Option<String>,
}

/// Executes the `plan` command.
///
/// Declares the application, validates and resolves it, and prints every
/// stack in emission order with its resources in provisioning order and
/// the outputs it imports from other stacks.
///
/// # Errors
///
/// Returns an error if configuration, validation, or resolution fails, or
/// if `--only` names an unknown stack.
pub fn execute(args: &PlanArgs, env_file: &Path) -> anyhow::Result<()> {
    let resolved = super::load_app(env_file)?.1.resolve()?;

    let stacks: Vec<&ResolvedStack> = resolved
        .stacks()
        .iter()
        .filter(|s| args.only.as_deref().is_none_or(|only| s.stack.name().as_str() == only))
        .collect();
    if let (Some(only), true) = (&args.only, stacks.is_empty()) {
        anyhow::bail!("unknown stack: {only}");
    }

    println!("Deployment Plan");
    println!("{}", rule(35));
    println!();

    for (position, resolved_stack) in stacks.iter().enumerate() {
        let stack = &resolved_stack.stack;
        println!("  {}. {BOLD}{}{RESET} {DIM}[{}]{RESET}", position + 1, stack.name(), stack.environment());
        if !stack.dependencies().is_empty() {
            let deps: Vec<&str> = stack.dependencies().iter().map(|d| d.as_str()).collect();
            println!("      after: {}", deps.join(", "));
        }
        for id in &resolved_stack.resource_order {
            if let Some(resource) = stack.resource(id) {
                println!("      + {id} {DIM}({}){RESET}", resource.kind());
            }
        }
        for import in stack.imports() {
            println!("      <- {import}");
        }
    }

    println!();
    println!("  {} stack(s) will be emitted.", stacks.len());
    Ok(())
}
