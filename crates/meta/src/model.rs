//! The in-memory type model built from a filtered and patched grammar.
//!
//! Everything the emitters need is resolved here: opcode numbering, enum
//! tables with identifier-safe names, per-instruction signatures and the Rust
//! representation of every non-enum operand kind. Building the model checks
//! every invariant the emitters rely on, so emission itself cannot fail.

use crate::error::{Error, GrammarError, ModelError, Result};
use crate::grammar::{
    ExtGrammar, Grammar, Instruction, OperandKind, RESULT_ID_KIND, RESULT_TYPE_KIND,
    TAGGED_UNION_CATEGORY,
};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Name of the distinguished field holding the result type.
pub const TYPE_FIELD: &str = "type";

/// Name of the enum kind instructions draw their requirements from.
pub const CAPABILITY_KIND: &str = "Capability";

/// Fixed renames for enumerants that are not valid identifiers.
const ENUMERANT_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("1D", "Dim1D"),
    ("2D", "Dim2D"),
    ("3D", "Dim3D"),
    ("2x2", "CooperativeMatrixReduce2x2"),
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// The category of an operand kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    ValueEnum,
    BitEnum,
    Id,
    Literal,
    Composite,
    TaggedUnion,
}

impl Category {
    pub fn parse(kind: &str, category: &str) -> Result<Self, ModelError> {
        Ok(match category {
            "ValueEnum" => Category::ValueEnum,
            "BitEnum" => Category::BitEnum,
            "Id" => Category::Id,
            "Literal" => Category::Literal,
            "Composite" => Category::Composite,
            TAGGED_UNION_CATEGORY => Category::TaggedUnion,
            _ => {
                return Err(ModelError::UnknownCategory {
                    kind: kind.to_string(),
                    category: category.to_string(),
                });
            }
        })
    }

    pub fn is_enum(self) -> bool {
        matches!(self, Category::ValueEnum | Category::BitEnum)
    }
}

/// How many values an operand holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    /// No quantifier.
    One,
    /// `?`
    Optional,
    /// `*`
    Repeated,
}

impl Cardinality {
    /// Map a grammar quantifier; `None` for quantifiers we do not model.
    pub fn from_quantifier(quantifier: Option<&str>) -> Option<Self> {
        match quantifier {
            None | Some("") => Some(Cardinality::One),
            Some("?") => Some(Cardinality::Optional),
            Some("*") => Some(Cardinality::Repeated),
            Some(_) => None,
        }
    }
}

/// A stored operand of an instruction record or tagged-union case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operand {
    pub name: String,
    pub kind: String,
    pub cardinality: Cardinality,
}

/// The fixed shape of one instruction record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// Record type name, the grammar's opname (`OpIAdd`).
    pub class_name: String,
    /// Opcode enumerator name (`IAdd`).
    pub name: String,
    pub opcode: u32,
    /// Stored fields in declaration order; the `type` field, if any, is among
    /// them at its declared position.
    pub fields: Vec<Operand>,
    /// Whether the instruction defines a result id.
    pub has_result: bool,
    /// Required capabilities, as `Capability` enumerator names.
    pub capabilities: Vec<String>,
}

impl Signature {
    pub fn result_type(&self) -> Option<&Operand> {
        self.fields.iter().find(|o| o.name == TYPE_FIELD)
    }
}

/// Ordered mapping from opcode name to number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpcodeTable {
    opcodes: IndexMap<String, u32>,
    /// `(alias, canonical name)` pairs.
    aliases: Vec<(String, String)>,
}

impl OpcodeTable {
    pub fn get(&self, name: &str) -> Option<u32> {
        self.opcodes.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.opcodes.iter().map(|(name, &op)| (name.as_str(), op))
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.opcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opcodes.is_empty()
    }
}

/// One enumerator of a generated enum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub value: u32,
    /// The value as spelled in the grammar (`17`, `0x0004`).
    pub literal: String,
}

/// A `ValueEnum` or `BitEnum` operand kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindEnum {
    pub name: String,
    pub category: Category,
    /// One entry per distinct value, in declaration order.
    pub variants: Vec<EnumVariant>,
    /// `(alias, canonical name)` for names repeating an earlier value.
    pub aliases: Vec<(String, String)>,
}

impl KindEnum {
    fn contains(&self, name: &str) -> bool {
        self.variants.iter().any(|v| v.name == name) || self.aliases.iter().any(|(a, _)| a == name)
    }
}

/// A `Composite` kind, rendered as a tuple of its bases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Composite {
    pub name: String,
    pub bases: Vec<String>,
}

/// One case of a [`TaggedUnion`]: a selector enumerant and its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnionCase {
    pub name: String,
    pub fields: Vec<Operand>,
}

/// A payload whose shape is chosen by the value of a preceding enum operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedUnion {
    pub name: String,
    pub selector: String,
    pub cases: Vec<UnionCase>,
}

/// The complete model of a core grammar.
#[derive(Clone, Debug)]
pub struct Model {
    pub version: Option<String>,
    pub opcodes: OpcodeTable,
    pub enums: Vec<KindEnum>,
    /// `Id` kinds.
    pub ids: Vec<String>,
    /// `Literal` kinds and their Rust representation.
    pub literals: Vec<(String, &'static str)>,
    pub composites: Vec<Composite>,
    pub unions: Vec<TaggedUnion>,
    pub instructions: Vec<Signature>,
    categories: IndexMap<String, Category>,
}

impl Model {
    /// Build and validate the model of `grammar`.
    pub fn build(grammar: &Grammar) -> Result<Self> {
        let mut categories = IndexMap::new();
        for kind in &grammar.operand_kinds {
            categories.insert(kind.kind.clone(), Category::parse(&kind.kind, &kind.category)?);
        }
        let known = |user: &str, kind: &str| {
            if categories.contains_key(kind) {
                Ok(())
            } else {
                Err(ModelError::UnknownOperandKind {
                    user: user.to_string(),
                    kind: kind.to_string(),
                })
            }
        };

        let enums = build_kind_enums(&grammar.operand_kinds)?;

        let mut ids = Vec::new();
        let mut literals = Vec::new();
        let mut composites = Vec::new();
        let mut unions = Vec::new();
        for kind in &grammar.operand_kinds {
            match categories[&kind.kind] {
                Category::ValueEnum | Category::BitEnum => {}
                Category::Id => ids.push(kind.kind.clone()),
                Category::Literal => {
                    let repr = literal_type(&kind.kind).ok_or_else(|| {
                        ModelError::UnsupportedLiteral {
                            kind: kind.kind.clone(),
                        }
                    })?;
                    literals.push((kind.kind.clone(), repr));
                }
                Category::Composite => {
                    for base in &kind.bases {
                        known(&kind.kind, base)?;
                    }
                    composites.push(Composite {
                        name: kind.kind.clone(),
                        bases: kind.bases.clone(),
                    });
                }
                Category::TaggedUnion => {
                    let union = build_tagged_union(kind, &grammar.operand_kinds)?;
                    for case in &union.cases {
                        for field in &case.fields {
                            known(&kind.kind, &field.kind)?;
                        }
                    }
                    unions.push(union);
                }
            }
        }

        let opcodes = build_opcode_table(&grammar.instructions)?;

        let capabilities = enums.iter().find(|e| e.name == CAPABILITY_KIND);
        let mut instructions = Vec::with_capacity(grammar.instructions.len());
        for inst in &grammar.instructions {
            for operand in &inst.operands {
                known(&inst.opname, &operand.kind)?;
            }
            let signature = build_signature(inst)?;
            for capability in &signature.capabilities {
                if !capabilities.is_some_and(|e| e.contains(capability)) {
                    return Err(ModelError::UnknownCapability {
                        instruction: inst.opname.clone(),
                        capability: capability.clone(),
                    }
                    .into());
                }
            }
            instructions.push(signature);
        }

        log::debug!(
            "built model: {} instructions, {} enums, {} tagged unions",
            instructions.len(),
            enums.len(),
            unions.len()
        );

        Ok(Model {
            version: grammar.version(),
            opcodes,
            enums,
            ids,
            literals,
            composites,
            unions,
            instructions,
            categories,
        })
    }

    /// The category of a declared operand kind.
    pub fn category(&self, kind: &str) -> Option<Category> {
        self.categories.get(kind).copied()
    }

    pub fn enum_kind(&self, name: &str) -> Option<&KindEnum> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn has_capabilities(&self) -> bool {
        self.enum_kind(CAPABILITY_KIND).is_some()
    }

    /// Every operand kind used by a stored instruction field, in first-use
    /// order.
    pub fn field_kinds(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.instructions
            .iter()
            .flat_map(|s| &s.fields)
            .map(|f| f.kind.as_str())
            .filter(|k| seen.insert(*k))
            .collect()
    }
}

/// The model of an extended instruction set: opcode names and numbers only.
#[derive(Clone, Debug)]
pub struct ExtModel {
    /// Import name, e.g. `OpenCL.std`.
    pub name: String,
    /// Rust type of the opcode enum, e.g. `OpenCLstd`.
    pub type_name: String,
    /// File and function stem, e.g. `opencl_std`.
    pub module_name: String,
    pub version: Option<String>,
    pub opcodes: OpcodeTable,
}

impl ExtModel {
    pub fn build(name: &str, grammar: &ExtGrammar) -> Result<Self, ModelError> {
        let type_name: String = name.chars().filter(|&c| c != '.').collect();
        let type_name = identifier("Ext", &type_name).into_owned();
        let module_name = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        let opcodes = build_table(&grammar.instructions, |opname| {
            identifier(&type_name, opname).into_owned()
        })?;
        Ok(ExtModel {
            name: name.to_string(),
            type_name,
            module_name,
            version: grammar.version(),
            opcodes,
        })
    }
}

/// Opcode name of an instruction: its opname without the `Op` prefix.
pub fn opcode_name(opname: &str) -> &str {
    opname.strip_prefix("Op").unwrap_or(opname)
}

/// Order-preserving opcode table; duplicate numbers or names are errors.
pub fn build_opcode_table(instructions: &[Instruction]) -> Result<OpcodeTable, ModelError> {
    build_table(instructions, |opname| opcode_name(opname).to_string())
}

fn build_table(
    instructions: &[Instruction],
    name_of: impl Fn(&str) -> String,
) -> Result<OpcodeTable, ModelError> {
    let mut table = OpcodeTable::default();
    let mut by_number: HashMap<u32, &str> = HashMap::new();
    for inst in instructions {
        if let Some(first) = by_number.insert(inst.opcode, &inst.opname) {
            return Err(ModelError::DuplicateOpcode {
                opcode: inst.opcode,
                first: first.to_string(),
                second: inst.opname.clone(),
            });
        }
        let name = name_of(&inst.opname);
        if table.opcodes.insert(name.clone(), inst.opcode).is_some() {
            return Err(ModelError::DuplicateInstruction {
                name: inst.opname.clone(),
            });
        }
        for alias in &inst.aliases {
            table.aliases.push((name_of(alias), name.clone()));
        }
    }
    let mut aliases = HashSet::new();
    for (alias, _) in &table.aliases {
        if table.opcodes.contains_key(alias) || !aliases.insert(alias) {
            return Err(ModelError::DuplicateInstruction {
                name: alias.clone(),
            });
        }
    }
    Ok(table)
}

/// Enum tables of every `ValueEnum` and `BitEnum` kind, values untouched.
pub fn build_kind_enums(operand_kinds: &[OperandKind]) -> Result<Vec<KindEnum>> {
    let mut enums = Vec::new();
    for kind in operand_kinds {
        let category = Category::parse(&kind.kind, &kind.category)?;
        if !category.is_enum() {
            continue;
        }
        let mut out = KindEnum {
            name: kind.kind.clone(),
            category,
            variants: Vec::with_capacity(kind.enumerants.len()),
            aliases: Vec::new(),
        };
        let mut names = HashSet::new();
        let mut canonical: HashMap<u32, String> = HashMap::new();
        let mut claim = |name: &str| {
            if names.insert(name.to_string()) {
                Ok(())
            } else {
                Err(ModelError::DuplicateEnumerant {
                    kind: kind.kind.clone(),
                    enumerant: name.to_string(),
                })
            }
        };

        for e in &kind.enumerants {
            let value = e.value.parse().ok_or_else(|| GrammarError::EnumerantValue {
                kind: kind.kind.clone(),
                enumerant: e.enumerant.clone(),
                value: e.value.literal(),
            })?;
            let name = identifier(&kind.kind, &e.enumerant).into_owned();
            claim(&name)?;
            let target = match canonical.get(&value) {
                Some(target) => {
                    out.aliases.push((name, target.clone()));
                    target.clone()
                }
                None => {
                    canonical.insert(value, name.clone());
                    out.variants.push(EnumVariant {
                        name: name.clone(),
                        value,
                        literal: e.value.literal(),
                    });
                    name
                }
            };
            for alias in &e.aliases {
                let alias = identifier(&kind.kind, alias).into_owned();
                claim(&alias)?;
                out.aliases.push((alias, target.clone()));
            }
        }
        enums.push(out);
    }
    Ok(enums)
}

/// Classify the operands of `instruction` into its record signature.
pub fn build_signature(instruction: &Instruction) -> Result<Signature, ModelError> {
    let mut fields = Vec::new();
    let mut has_type = false;
    let mut has_result = false;
    let mut positional = 0;
    for operand in &instruction.operands {
        let cardinality = Cardinality::from_quantifier(operand.quantifier.as_deref())
            .ok_or_else(|| ModelError::UnsupportedQuantifier {
                instruction: instruction.opname.clone(),
                kind: operand.kind.clone(),
                quantifier: operand.quantifier.clone().unwrap_or_default(),
            })?;
        let repeated = |seen: bool| {
            if seen {
                Err(ModelError::RepeatedResultOperand {
                    instruction: instruction.opname.clone(),
                    kind: operand.kind.clone(),
                })
            } else {
                Ok(true)
            }
        };
        match operand.kind.as_str() {
            RESULT_ID_KIND => has_result = repeated(has_result)?,
            RESULT_TYPE_KIND => {
                has_type = repeated(has_type)?;
                fields.push(Operand {
                    name: TYPE_FIELD.to_string(),
                    kind: operand.kind.clone(),
                    cardinality,
                });
            }
            _ => {
                fields.push(Operand {
                    name: format!("op{positional}"),
                    kind: operand.kind.clone(),
                    cardinality,
                });
                positional += 1;
            }
        }
    }
    Ok(Signature {
        class_name: instruction.opname.clone(),
        name: opcode_name(&instruction.opname).to_string(),
        opcode: instruction.opcode,
        fields,
        has_result,
        capabilities: instruction
            .capabilities
            .iter()
            .map(|c| identifier(CAPABILITY_KIND, c).into_owned())
            .collect(),
    })
}

/// Whether `instruction` produces a result id.
pub fn has_result(instruction: &Instruction) -> bool {
    instruction
        .operands
        .iter()
        .any(|operand| operand.kind == RESULT_ID_KIND)
}

fn build_tagged_union(kind: &OperandKind, all: &[OperandKind]) -> Result<TaggedUnion> {
    let unknown = |selector: &str| ModelError::UnknownOperandKind {
        user: kind.kind.clone(),
        kind: selector.to_string(),
    };
    let selector = kind.bases.first().ok_or_else(|| unknown(""))?;
    let selector_kind = all
        .iter()
        .find(|k| &k.kind == selector)
        .ok_or_else(|| unknown(selector))?;

    let mut seen = HashSet::new();
    let mut cases = Vec::new();
    for e in &selector_kind.enumerants {
        // Aliases share the payload of the enumerant they repeat.
        if !seen.insert(e.value.parse()) || e.parameters.is_empty() {
            continue;
        }
        let mut fields = Vec::with_capacity(e.parameters.len());
        for (i, param) in e.parameters.iter().enumerate() {
            let cardinality = Cardinality::from_quantifier(param.quantifier.as_deref())
                .ok_or_else(|| ModelError::UnsupportedQuantifier {
                    instruction: format!("{}::{}", selector, e.enumerant),
                    kind: param.kind.clone(),
                    quantifier: param.quantifier.clone().unwrap_or_default(),
                })?;
            fields.push(Operand {
                name: format!("op{i}"),
                kind: param.kind.clone(),
                cardinality,
            });
        }
        cases.push(UnionCase {
            name: identifier(selector, &e.enumerant).into_owned(),
            fields,
        });
    }
    Ok(TaggedUnion {
        name: kind.kind.clone(),
        selector: selector.clone(),
        cases,
    })
}

/// Rust representation of a `Literal` operand kind.
pub fn literal_type(kind: &str) -> Option<&'static str> {
    Some(match kind {
        "LiteralInteger" | "LiteralExtInstInteger" => "i32",
        "LiteralFloat" => "f32",
        "LiteralString" => "String",
        "LiteralContextDependentNumber" => "LiteralNumber",
        "LiteralSpecConstantOpInteger" => "Op",
        _ => return None,
    })
}

/// Turn a grammar name into a Rust identifier: first through the fixed
/// substitution table, then by replacing unusable characters with `_` and
/// prefixing a leading digit with `context`.
pub fn identifier<'a>(context: &str, name: &'a str) -> Cow<'a, str> {
    if let Some((_, sub)) = ENUMERANT_SUBSTITUTIONS.iter().find(|(from, _)| *from == name) {
        return Cow::Borrowed(sub);
    }
    if is_identifier(name) {
        return Cow::Borrowed(name);
    }
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if ident.chars().all(|c| c == '_') || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert_str(0, context);
    }
    if RUST_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    Cow::Owned(ident)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    first_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name != "_"
        && !RUST_KEYWORDS.contains(&name)
}
