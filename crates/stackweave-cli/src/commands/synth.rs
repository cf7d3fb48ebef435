//! `swv synth`: Write one template per stack.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use stackweave_common::constants::DEFAULT_OUT_DIR;
use stackweave_compose::template::TemplateFormat;

use crate::output::{GREEN, RESET};

/// Template serialization format.
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum Format {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl From<Format> for TemplateFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => Self::Json,
            Format::Yaml => Self::Yaml,
        }
    }
}

/// Arguments for the `synth` command.
#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Directory the templates are written to.
    #[arg(long, env = "SWV_OUT_DIR", default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// Template format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,
}

/// Executes the `synth` command.
///
/// # Errors
///
/// Returns an error if resolution fails or a template cannot be written.
/// Nothing is written when resolution fails.
pub fn execute(args: &SynthArgs, env_file: &Path) -> anyhow::Result<()> {
    let written = super::load_app(env_file)?.1.synth_to(&args.out_dir, args.format.into())?;
    for path in &written {
        println!("  {GREEN}\u{2713}{RESET} {}", path.display());
    }
    println!();
    println!("  {} template(s) written to {}", written.len(), args.out_dir.display());
    Ok(())
}
