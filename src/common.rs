//! Options and helpers shared by the generating commands.

use anyhow::{Context, Result};
use clap::Parser;
use spirvgen_meta::{Report, Rustfmt};
use std::path::PathBuf;

/// Where generated files go and how they are formatted.
#[derive(Parser)]
pub struct OutputOptions {
    /// Directory the generated files are written to.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Formatter executable run on every generated file.
    #[arg(short = 'c', long, value_name = "FORMATTER", default_value = "rustfmt")]
    pub formatter: String,
}

impl OutputOptions {
    /// Resolve the formatter before anything is generated.
    pub fn formatter(&self) -> Result<Rustfmt> {
        Rustfmt::locate(&self.formatter)
            .with_context(|| format!("cannot format generated files with `{}`", self.formatter))
    }
}

/// Log what a generation run did.
pub fn log_report(report: &Report) {
    if report.warnings.is_empty() {
        log::info!("generated {} file(s)", report.written.len());
    } else {
        log::warn!(
            "generated {} file(s), {} left unformatted",
            report.written.len(),
            report.warnings.len()
        );
    }
}
