//! Formatted output helpers for CLI commands.
//!
//! Provides ANSI styling constants, aligned key/value tables, and
//! one-line renderings of deployment events.

use stackweave_compose::output::OperatorOutput;
use stackweave_sdk::event::DeploymentEvent;

pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const GREEN: &str = "\x1b[32m";
pub const RED: &str = "\x1b[31m";
pub const YELLOW: &str = "\x1b[33m";
pub const RESET: &str = "\x1b[0m";

/// A horizontal rule `width` characters wide.
#[must_use]
pub fn rule(width: usize) -> String {
    "\u{2550}".repeat(width)
}

/// Renders `(label, value)` rows with labels padded to a common width.
#[must_use]
pub fn aligned(rows: &[(String, String)]) -> Vec<String> {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("{label:<width$}  {value}"))
        .collect()
}

/// Renders resolved outputs as `Stack.key  value` rows.
#[must_use]
pub fn format_outputs(outputs: &[OperatorOutput]) -> Vec<String> {
    let rows: Vec<(String, String)> = outputs
        .iter()
        .map(|o| (format!("{}.{}", o.stack, o.key), o.value.clone()))
        .collect();
    aligned(&rows)
}

/// One-line description of a deployment event, without styling.
#[must_use]
pub fn format_event(event: &DeploymentEvent) -> String {
    let at = event.at().format("%H:%M:%S");
    match event {
        DeploymentEvent::StackStarted { stack, .. } => format!("[{at}] {stack}: provisioning"),
        DeploymentEvent::StackProvisioned { stack, outputs, .. } => {
            format!("[{at}] {stack}: provisioned ({outputs} output(s))")
        }
        DeploymentEvent::StackFailed { stack, reason, .. } => {
            format!("[{at}] {stack}: failed: {reason}")
        }
    }
}
