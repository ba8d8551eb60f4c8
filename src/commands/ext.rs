//! The module that implements the `spirvgen ext` command.

use crate::common::{log_report, OutputOptions};
use anyhow::{Context, Result};
use clap::Parser;
use spirvgen_meta::generate_extension;
use std::path::PathBuf;

/// Generates the opcode enum and name table of an extended instruction set.
#[derive(Parser)]
pub struct ExtCommand {
    /// Import name of the instruction set, e.g. `OpenCL.std`.
    #[arg(value_name = "NAME")]
    name: String,

    /// Path to the set's `extinst.*.grammar.json`.
    #[arg(value_name = "GRAMMAR")]
    grammar: PathBuf,

    #[command(flatten)]
    output: OutputOptions,
}

impl ExtCommand {
    /// Executes the command.
    pub fn execute(self) -> Result<()> {
        let formatter = self.output.formatter()?;
        let report = generate_extension(
            &self.name,
            &self.grammar,
            &self.output.output,
            Some(&formatter),
        )
        .with_context(|| format!("failed to generate `{}`", self.name))?;
        log_report(&report);
        Ok(())
    }
}
