//! The `spirvgen` command line tool.
//!
//! Generates Rust source for a SPIR-V instruction set from its grammar.
//! See `spirvgen --help` for usage.

use anyhow::Result;
use clap::Parser;

/// SPIR-V grammar to Rust code generator
#[derive(Parser)]
#[command(
    name = "spirvgen",
    version,
    after_help = "Usage examples:\n\
                  \n\
                  Generating the core model with the bundled opcode filter:\n\
                  \n  \
                  spirvgen core spirv.core.grammar.json -o src/spv\n\
                  \n\
                  Generating an extended instruction set:\n\
                  \n  \
                  spirvgen ext OpenCL.std extinst.opencl.std.100.grammar.json -o src/spv\n"
)]
struct Spirvgen {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser)]
enum Subcommand {
    /// Generates enums, names, instruction records and visitors from a core grammar
    Core(spirvgen_cli::commands::CoreCommand),

    /// Generates the opcode enum and name table of an extended instruction set
    Ext(spirvgen_cli::commands::ExtCommand),
}

impl Spirvgen {
    /// Executes the command.
    pub fn execute(self) -> Result<()> {
        match self.subcommand {
            Subcommand::Core(c) => c.execute(),
            Subcommand::Ext(c) => c.execute(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Spirvgen::parse().execute()
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Spirvgen::command().debug_assert()
}
