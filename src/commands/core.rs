//! The module that implements the `spirvgen core` command.

use crate::common::{log_report, OutputOptions};
use anyhow::{Context, Result};
use clap::Parser;
use spirvgen_meta::{generate_core, Filter};
use std::path::PathBuf;

/// Generates the typed model of a core SPIR-V grammar.
#[derive(Parser)]
pub struct CoreCommand {
    /// Path to `spirv.core.grammar.json`.
    #[arg(value_name = "GRAMMAR")]
    grammar: PathBuf,

    /// Filter document selecting the opcode intervals to generate; defaults to
    /// the bundled filter.
    #[arg(short, long, value_name = "FILTER")]
    filter: Option<PathBuf>,

    #[command(flatten)]
    output: OutputOptions,
}

impl CoreCommand {
    /// Executes the command.
    pub fn execute(self) -> Result<()> {
        let formatter = self.output.formatter()?;
        let filter = match &self.filter {
            Some(path) => Filter::load(path)
                .with_context(|| format!("failed to load filter '{}'", path.display()))?,
            None => Filter::bundled(),
        };

        let report = generate_core(&self.grammar, &filter, &self.output.output, Some(&formatter))
            .with_context(|| format!("failed to generate from '{}'", self.grammar.display()))?;
        log_report(&report);
        Ok(())
    }
}
