//! Loading, filtering and patching of SPIR-V grammar documents.
//!
//! The documents are the `spirv.core.grammar.json` and
//! `extinst.*.grammar.json` files published by the SPIRV-Headers project. Only
//! the parts the model builder needs are deserialized; unknown fields are
//! ignored.

use crate::error::GrammarError;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use std::fs;
use std::path::Path;

/// Operand kind marking the type of the value an instruction produces.
pub const RESULT_TYPE_KIND: &str = "IdResultType";

/// Operand kind marking the identifier of the value an instruction produces.
pub const RESULT_ID_KIND: &str = "IdResult";

/// Category of the operand kinds synthesized by [`patch`].
pub const TAGGED_UNION_CATEGORY: &str = "TaggedUnion";

/// A core instruction-set grammar.
#[derive(Clone, Debug, Deserialize)]
pub struct Grammar {
    pub major_version: Option<u32>,
    pub minor_version: Option<u32>,
    pub revision: Option<u32>,
    pub instructions: Vec<Instruction>,
    pub operand_kinds: Vec<OperandKind>,
}

impl Grammar {
    /// Read a core grammar; both the `instructions` and `operand_kinds`
    /// collections must be present.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
        read_document(path.as_ref())
    }

    /// `major.minor rev. N`, if the grammar declares its version.
    pub fn version(&self) -> Option<String> {
        let (major, minor) = (self.major_version?, self.minor_version?);
        Some(match self.revision {
            Some(rev) => format!("{major}.{minor} rev. {rev}"),
            None => format!("{major}.{minor}"),
        })
    }
}

/// An extended instruction-set grammar, e.g. `OpenCL.std`.
#[derive(Clone, Debug, Deserialize)]
pub struct ExtGrammar {
    pub version: Option<u32>,
    pub revision: Option<u32>,
    pub instructions: Vec<Instruction>,
}

impl ExtGrammar {
    /// Read an extended grammar; only `instructions` is required.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
        read_document(path.as_ref())
    }

    pub fn version(&self) -> Option<String> {
        let version = self.version?;
        Some(match self.revision {
            Some(rev) => format!("{version} rev. {rev}"),
            None => version.to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Instruction {
    pub opname: String,
    pub opcode: u32,
    #[serde(default)]
    pub operands: Vec<Operand>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Operand {
    pub kind: String,
    pub quantifier: Option<String>,
    pub name: Option<String>,
}

impl Operand {
    /// An exactly-one operand of `kind`.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            quantifier: None,
            name: None,
        }
    }

    /// Set the quantifier (`?` or `*`).
    pub fn with_quantifier(mut self, quantifier: impl Into<String>) -> Self {
        self.quantifier = Some(quantifier.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OperandKind {
    pub category: String,
    pub kind: String,
    #[serde(default)]
    pub enumerants: Vec<Enumerant>,
    /// Member kinds of a `Composite`, or the selector kind of a tagged union.
    #[serde(default)]
    pub bases: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Enumerant {
    pub enumerant: String,
    pub value: EnumValue,
    /// Operands that follow this enumerant when it is chosen.
    #[serde(default)]
    pub parameters: Vec<Operand>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// An enumerant value as spelled in the grammar: `ValueEnum`s use integers,
/// `BitEnum`s hexadecimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Number(u32),
    Text(String),
}

impl EnumValue {
    /// The numeric value, if the spelling is a valid `u32`.
    pub fn parse(&self) -> Option<u32> {
        match self {
            EnumValue::Number(n) => Some(*n),
            EnumValue::Text(s) => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => s.parse().ok(),
            },
        }
    }

    /// The value exactly as declared, suitable as a Rust integer literal.
    pub fn literal(&self) -> String {
        match self {
            EnumValue::Number(n) => n.to_string(),
            EnumValue::Text(s) => s.clone(),
        }
    }
}

/// Inclusive opcode intervals selecting the instructions a backend needs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Filter {
    include: Vec<[u32; 2]>,
}

/// Opcode intervals used when no filter document is given: the core
/// instruction set plus the Khronos and Intel extensions used by compute
/// kernels (subgroups, cooperative matrices, block IO, atomic float and
/// arbitrary-precision conversions).
const BUNDLED_FILTER: &[[u32; 2]] = &[
    [0, 403],
    [4416, 4433],
    [4456, 4461],
    [5571, 5578],
    [5946, 5947],
    [6035, 6035],
    [6401, 6401],
    [6449, 6455],
];

impl Filter {
    /// Build a filter from `(low, high)` pairs.
    pub fn new(include: impl IntoIterator<Item = (u32, u32)>) -> Result<Self, GrammarError> {
        let filter = Filter {
            include: include.into_iter().map(|(lo, hi)| [lo, hi]).collect(),
        };
        filter.validate()?;
        Ok(filter)
    }

    /// Read a filter document of the form `{"include": [[low, high], ...]}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
        let filter: Filter = read_document(path.as_ref())?;
        filter.validate()?;
        Ok(filter)
    }

    /// The filter shipped with this crate.
    pub fn bundled() -> Self {
        Filter {
            include: BUNDLED_FILTER.to_vec(),
        }
    }

    pub fn contains(&self, opcode: u32) -> bool {
        self.include
            .iter()
            .any(|&[lo, hi]| lo <= opcode && opcode <= hi)
    }

    fn validate(&self) -> Result<(), GrammarError> {
        match self.include.iter().find(|[lo, hi]| lo > hi) {
            Some(&[low, high]) => Err(GrammarError::EmptyInterval { low, high }),
            None => Ok(()),
        }
    }
}

/// Retain the instructions whose opcode lies in at least one interval of
/// `filter`, in their original order.
pub fn filter(mut grammar: Grammar, filter: &Filter) -> Grammar {
    let before = grammar.instructions.len();
    grammar.instructions.retain(|inst| filter.contains(inst.opcode));
    log::debug!(
        "filter retained {} of {before} instructions",
        grammar.instructions.len()
    );
    grammar
}

/// An instruction whose trailing enum operand decides the shape of a payload
/// the grammar cannot express.
struct Patch {
    opname: &'static str,
    selector: &'static str,
    attribute: &'static str,
}

// `OpDecorateId`, `OpMemberDecorate` and `OpExecutionModeId` share the
// enum-then-payload shape but are not patched.
const PATCHES: &[Patch] = &[
    Patch {
        opname: "OpDecorate",
        selector: "Decoration",
        attribute: "DecorationAttr",
    },
    Patch {
        opname: "OpExecutionMode",
        selector: "ExecutionMode",
        attribute: "ExecutionModeAttr",
    },
];

/// Append a tagged-union payload operand to the instructions in the fixed
/// patch list and register the union kinds. Applying it twice is a no-op.
pub fn patch(mut grammar: Grammar) -> Grammar {
    for p in PATCHES {
        let Some(inst) = grammar
            .instructions
            .iter_mut()
            .find(|inst| inst.opname == p.opname)
        else {
            continue;
        };
        if inst.operands.last().map(|o| o.kind.as_str()) != Some(p.selector) {
            continue;
        }
        let mut payload = Operand::new(p.attribute).with_quantifier("?");
        payload.name = Some(format!("'{}'", p.attribute));
        inst.operands.push(payload);
        log::debug!("patched `{}` with a `{}` payload", p.opname, p.attribute);

        if !grammar.operand_kinds.iter().any(|k| k.kind == p.attribute) {
            grammar.operand_kinds.push(OperandKind {
                category: TAGGED_UNION_CATEGORY.to_string(),
                kind: p.attribute.to_string(),
                enumerants: Vec::new(),
                bases: vec![p.selector.to_string()],
            });
        }
    }
    grammar
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, GrammarError> {
    let text = fs::read_to_string(path).map_err(|source| GrammarError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| GrammarError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
