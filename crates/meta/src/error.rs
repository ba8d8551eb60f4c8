//! Errors returned while generating the SPIR-V model.
//!
//! Grammar and model errors abort a run before anything is written; tooling
//! errors only ever come from the formatter post-step and are reported as
//! warnings by [`crate::output::write`].

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Shorthand for results of this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any error that occurred while generating source files.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input documents could not be read or are structurally incomplete.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// The grammar violates an invariant the emitters rely on.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The source formatter is missing or failed.
    #[error(transparent)]
    Tooling(#[from] ToolingError),

    /// A generated file could not be written.
    #[error("failed to write '{}'", path.display())]
    Io {
        /// The file or directory being written.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },
}

/// Malformed or structurally incomplete input.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    /// The document could not be read from disk.
    #[error("failed to read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not valid JSON or does not have the expected shape,
    /// e.g. a missing `instructions` or `operand_kinds` collection.
    #[error("'{}' is not a valid grammar document: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An enumerant value is neither an integer nor a hexadecimal string.
    #[error("enumerant `{kind}::{enumerant}` has an unparsable value `{value}`")]
    EnumerantValue {
        kind: String,
        enumerant: String,
        value: String,
    },

    /// A filter interval whose lower bound exceeds its upper bound.
    #[error("filter interval [{low}, {high}] is empty")]
    EmptyInterval { low: u32, high: u32 },
}

/// A violated model invariant.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("opcode {opcode} is used by both `{first}` and `{second}`")]
    DuplicateOpcode {
        opcode: u32,
        first: String,
        second: String,
    },

    #[error("instruction `{name}` is declared twice")]
    DuplicateInstruction { name: String },

    #[error("enumerant `{kind}::{enumerant}` is declared twice")]
    DuplicateEnumerant { kind: String, enumerant: String },

    #[error("instruction `{instruction}`: operand of kind `{kind}` has unsupported quantifier `{quantifier}`")]
    UnsupportedQuantifier {
        instruction: String,
        kind: String,
        quantifier: String,
    },

    #[error("instruction `{instruction}` has more than one `{kind}` operand")]
    RepeatedResultOperand { instruction: String, kind: String },

    #[error("operand kind `{kind}` has unrecognized category `{category}`")]
    UnknownCategory { kind: String, category: String },

    #[error("`{user}` refers to undeclared operand kind `{kind}`")]
    UnknownOperandKind { user: String, kind: String },

    #[error("literal kind `{kind}` has no Rust representation")]
    UnsupportedLiteral { kind: String },

    #[error("instruction `{instruction}` requires unknown capability `{capability}`")]
    UnknownCapability {
        instruction: String,
        capability: String,
    },
}

/// A failure of the external source formatter.
#[derive(Debug, thiserror::Error)]
pub enum ToolingError {
    #[error("could not find formatter executable `{name}`")]
    FormatterNotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to run `{}` on '{}'", formatter.display(), path.display())]
    FormatterSpawn {
        formatter: PathBuf,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("`{}` failed on '{}' ({status})", formatter.display(), path.display())]
    FormatterFailed {
        formatter: PathBuf,
        path: PathBuf,
        status: ExitStatus,
    },
}
