//! Generate a typed Rust model of the SPIR-V instruction set from the
//! machine-readable grammar published by Khronos.
//!
//! The pipeline is strictly sequential: load the grammar, filter and patch
//! it, build the [`Model`], emit the artifacts and write them out. Every
//! grammar or model error is reported before the first file is written.
//!
//! Generated files are sibling modules: a consumer mounts the core artifacts
//! next to each other, for example from a build script:
//!
//! ```ignore
//! pub mod enums { include!(concat!(env!("OUT_DIR"), "/enums.rs")); }
//! pub mod names { include!(concat!(env!("OUT_DIR"), "/names.rs")); }
//! pub mod instructions { include!(concat!(env!("OUT_DIR"), "/instructions.rs")); }
//! pub mod visit { include!(concat!(env!("OUT_DIR"), "/visit.rs")); }
//! ```

pub mod error;
pub mod generate;
pub mod grammar;
pub mod model;
pub mod output;

pub use error::{Error, GrammarError, ModelError, Result, ToolingError};
pub use grammar::{ExtGrammar, Filter, Grammar};
pub use model::{ExtModel, Model};
pub use output::{Artifact, Provenance, Report, Rustfmt};

use std::path::Path;

/// Generate `enums.rs`, `names.rs`, `instructions.rs` and `visit.rs` in
/// `out_dir` from the core grammar at `grammar_path`.
pub fn generate_core(
    grammar_path: &Path,
    filter: &Filter,
    out_dir: &Path,
    formatter: Option<&Rustfmt>,
) -> Result<Report> {
    log::debug!("loading core grammar '{}'", grammar_path.display());
    let grammar = Grammar::load(grammar_path)?;
    let grammar = grammar::patch(grammar::filter(grammar, filter));
    let model = Model::build(&grammar)?;
    let artifacts = generate::core_artifacts(&model);
    let provenance = Provenance::new(grammar_path, model.version.clone());
    output::write(out_dir, &artifacts, &provenance, formatter)
}

/// Generate the single file of the extended instruction set `name` in
/// `out_dir` from the grammar at `grammar_path`.
pub fn generate_extension(
    name: &str,
    grammar_path: &Path,
    out_dir: &Path,
    formatter: Option<&Rustfmt>,
) -> Result<Report> {
    log::debug!("loading extended grammar '{}'", grammar_path.display());
    let grammar = ExtGrammar::load(grammar_path)?;
    let model = ExtModel::build(name, &grammar)?;
    let artifact = generate::emit_extension(&model);
    let provenance = Provenance::new(grammar_path, model.version.clone());
    output::write(out_dir, &[artifact], &provenance, formatter)
}
