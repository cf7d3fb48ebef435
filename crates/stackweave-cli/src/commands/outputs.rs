//! `swv outputs`: List declared outputs and their export names.

use std::path::Path;

use clap::Args;
use stackweave_common::types::StackName;
use stackweave_compose::resolver::ResolvedApp;

use crate::output::{DIM, RESET, aligned};

/// Arguments for the `outputs` command.
#[derive(Args, Debug)]
pub struct OutputsArgs {
    /// Show only the named stack.
    #[arg(long)]
    pub only: Option<String>,
}

/// Executes the `outputs` command.
///
/// Values are late-bound, so the expression each output is rendered from
/// is shown rather than a value.
///
/// # Errors
///
/// Returns an error if configuration, validation, or resolution fails, or
/// if `--only` names an unknown stack.
pub fn execute(args: &OutputsArgs, env_file: &Path) -> anyhow::Result<()> {
    let resolved = super::load_app(env_file)?.1.resolve()?;
    let rows = output_rows(&resolved, args.only.as_deref())?;

    if rows.is_empty() {
        println!("  {DIM}no outputs declared{RESET}");
        return Ok(());
    }
    for line in aligned(&rows) {
        println!("  {line}");
    }
    Ok(())
}

/// Export name and expression of every output, in emission order.
fn output_rows(
    resolved: &ResolvedApp,
    only: Option<&str>,
) -> anyhow::Result<Vec<(String, String)>> {
    if let Some(only) = only {
        if resolved.get(&StackName::new(only)).is_none() {
            anyhow::bail!("unknown stack: {only}");
        }
    }

    Ok(resolved
        .stacks()
        .iter()
        .map(|resolved_stack| &resolved_stack.stack)
        .filter(|stack| only.is_none_or(|only| stack.name().as_str() == only))
        .flat_map(|stack| {
            stack.outputs().iter().map(move |output| {
                (format!("{}:{}", stack.name(), output.key), output.value.to_string())
            })
        })
        .collect())
}
