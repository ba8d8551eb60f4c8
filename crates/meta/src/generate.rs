//! Emitters turning a [`Model`] into Rust source artifacts.
//!
//! Emission is pure: every emitter reads the model and returns an
//! [`Artifact`]; nothing here touches the file system or can fail.

mod enums;
mod ext;
mod formatter;
mod inst;
mod names;
mod visit;

use crate::model::{Cardinality, ExtModel, Model, Operand, TYPE_FIELD};
use crate::output::Artifact;
use heck::ToSnakeCase;

pub use formatter::Formatter;

/// File names of the core artifacts, in emission order.
pub const CORE_FILES: [&str; 4] = ["enums.rs", "names.rs", "instructions.rs", "visit.rs"];

/// Name of the generated opcode enum.
pub(crate) const OPCODE_ENUM: &str = "Op";

/// All core artifacts of `model`.
pub fn core_artifacts(model: &Model) -> Vec<Artifact> {
    vec![
        emit_enums(model),
        emit_names(model),
        emit_instructions(model),
        emit_visitor(model),
    ]
}

/// `enums.rs`: the opcode enum and one enum per enum operand kind.
pub fn emit_enums(model: &Model) -> Artifact {
    let mut f = Formatter::new();
    enums::generate(&mut f, model);
    artifact(CORE_FILES[0], &[], f)
}

/// `names.rs`: total value-to-name lookups.
pub fn emit_names(model: &Model) -> Artifact {
    let mut f = Formatter::new();
    names::generate(&mut f, model);
    artifact(CORE_FILES[1], &["super::enums::*"], f)
}

/// `instructions.rs`: operand types, one record per instruction and `Inst`.
pub fn emit_instructions(model: &Model) -> Artifact {
    let mut f = Formatter::new();
    inst::generate(&mut f, model);
    artifact(CORE_FILES[2], &["super::enums::*"], f)
}

/// `visit.rs`: instruction dispatch and operand traversal.
pub fn emit_visitor(model: &Model) -> Artifact {
    let mut f = Formatter::new();
    visit::generate(&mut f, model);
    artifact(
        CORE_FILES[3],
        &["super::enums::*", "super::instructions::*"],
        f,
    )
}

/// `<module>.rs` for an extended instruction set.
pub fn emit_extension(model: &ExtModel) -> Artifact {
    let mut f = Formatter::new();
    ext::generate(&mut f, model);
    artifact(&format!("{}.rs", model.module_name), &[], f)
}

fn artifact(filename: &str, imports: &[&str], f: Formatter) -> Artifact {
    Artifact {
        filename: filename.to_string(),
        imports: imports.iter().map(|s| s.to_string()).collect(),
        body: f.finish(),
    }
}

/// `snake_case` rendering of a grammar name, for functions and methods.
pub(crate) fn snake(name: &str) -> String {
    name.to_snake_case()
}

/// Rust field name of a stored operand.
pub(crate) fn field_ident(operand: &Operand) -> &str {
    if operand.name == TYPE_FIELD {
        "ty"
    } else {
        &operand.name
    }
}

/// Stored Rust type of an operand: the kind, wrapped by its cardinality.
pub(crate) fn field_type(operand: &Operand) -> String {
    match operand.cardinality {
        Cardinality::One => operand.kind.clone(),
        Cardinality::Optional => format!("Option<{}>", operand.kind),
        Cardinality::Repeated => format!("Vec<{}>", operand.kind),
    }
}

/// Borrowed Rust type returned by an operand accessor.
pub(crate) fn accessor_type(operand: &Operand) -> String {
    match operand.cardinality {
        Cardinality::One => format!("&{}", operand.kind),
        Cardinality::Optional => format!("Option<&{}>", operand.kind),
        Cardinality::Repeated => format!("&[{}]", operand.kind),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::grammar::{self, Filter, Grammar};

    /// A small core grammar exercising every operand category.
    pub(crate) const GRAMMAR: &str = r#"{
        "major_version": 1, "minor_version": 6, "revision": 4,
        "instructions": [
            { "opname": "OpNop", "opcode": 0 },
            { "opname": "OpUndef", "opcode": 1, "operands": [
                { "kind": "IdResultType" }, { "kind": "IdResult" }
            ] },
            { "opname": "OpTypeImage", "opcode": 25, "operands": [
                { "kind": "IdResult" }, { "kind": "Dim" },
                { "kind": "AccessQualifier", "quantifier": "?" }
            ] },
            { "opname": "OpLoad", "opcode": 61, "operands": [
                { "kind": "IdResultType" }, { "kind": "IdResult" },
                { "kind": "IdRef" }, { "kind": "MemoryAccess", "quantifier": "?" }
            ] },
            { "opname": "OpDecorate", "opcode": 71, "operands": [
                { "kind": "IdRef" }, { "kind": "Decoration" }
            ] },
            { "opname": "OpPhi", "opcode": 245, "operands": [
                { "kind": "IdResultType" }, { "kind": "IdResult" },
                { "kind": "PairIdRefIdRef", "quantifier": "*" }
            ] },
            { "opname": "OpConstant", "opcode": 43, "operands": [
                { "kind": "IdResultType" }, { "kind": "IdResult" },
                { "kind": "LiteralContextDependentNumber" }
            ] },
            { "opname": "OpSubgroupBlockReadINTEL", "opcode": 5575,
              "capabilities": ["SubgroupBufferBlockIOINTEL"], "operands": [
                { "kind": "IdResultType" }, { "kind": "IdResult" }, { "kind": "IdRef" }
            ] },
            { "opname": "OpFiltered", "opcode": 4448 }
        ],
        "operand_kinds": [
            { "category": "Id", "kind": "IdResultType" },
            { "category": "Id", "kind": "IdResult" },
            { "category": "Id", "kind": "IdRef" },
            { "category": "Literal", "kind": "LiteralInteger" },
            { "category": "Literal", "kind": "LiteralContextDependentNumber" },
            { "category": "Composite", "kind": "PairIdRefIdRef", "bases": ["IdRef", "IdRef"] },
            { "category": "ValueEnum", "kind": "Dim", "enumerants": [
                { "enumerant": "1D", "value": 0 },
                { "enumerant": "2D", "value": 1 },
                { "enumerant": "Cube", "value": 3 }
            ] },
            { "category": "ValueEnum", "kind": "AccessQualifier", "enumerants": [] },
            { "category": "ValueEnum", "kind": "ImageChannelOrder", "enumerants": [
                { "enumerant": "R", "value": 0 },
                { "enumerant": "sRGB", "value": 13 }
            ] },
            { "category": "BitEnum", "kind": "MemoryAccess", "enumerants": [
                { "enumerant": "None", "value": "0x0000" },
                { "enumerant": "Volatile", "value": "0x0001" },
                { "enumerant": "Aligned", "value": "0x0002",
                  "parameters": [{ "kind": "LiteralInteger" }] }
            ] },
            { "category": "ValueEnum", "kind": "Decoration", "enumerants": [
                { "enumerant": "RelaxedPrecision", "value": 0 },
                { "enumerant": "SpecId", "value": 1,
                  "parameters": [{ "kind": "LiteralInteger" }] }
            ] },
            { "category": "ValueEnum", "kind": "Capability", "enumerants": [
                { "enumerant": "Shader", "value": 1 },
                { "enumerant": "SubgroupBufferBlockIOINTEL", "value": 5569,
                  "aliases": ["SubgroupBlockIO"] }
            ] }
        ]
    }"#;

    pub(crate) fn model() -> Model {
        let g: Grammar = serde_json::from_str(GRAMMAR).unwrap();
        let filter = Filter::new([(0, 256), (5575, 5575)]).unwrap();
        Model::build(&grammar::patch(grammar::filter(g, &filter))).unwrap()
    }

    #[test]
    fn core_artifact_layout() {
        let artifacts = core_artifacts(&model());
        let files: Vec<_> = artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(files, CORE_FILES);
        assert!(artifacts[0].imports.is_empty());
        assert_eq!(
            artifacts[3].imports,
            ["super::enums::*", "super::instructions::*"]
        );
    }

    #[test]
    fn filtered_opcodes_are_absent_everywhere() {
        for a in core_artifacts(&model()) {
            assert!(!a.body.contains("Filtered"), "{}", a.filename);
            assert!(!a.body.contains("4448"), "{}", a.filename);
        }
    }

    #[test]
    fn emission_is_deterministic() {
        assert_eq!(core_artifacts(&model()), core_artifacts(&model()));
    }

    #[test]
    fn field_rendering() {
        let op = |name: &str, cardinality| Operand {
            name: name.into(),
            kind: "IdRef".into(),
            cardinality,
        };
        let ty = op("type", Cardinality::One);
        assert_eq!(field_ident(&ty), "ty");
        assert_eq!(field_type(&ty), "IdRef");
        let opt = op("op0", Cardinality::Optional);
        assert_eq!(field_ident(&opt), "op0");
        assert_eq!(field_type(&opt), "Option<IdRef>");
        assert_eq!(accessor_type(&opt), "Option<&IdRef>");
        let rep = op("op1", Cardinality::Repeated);
        assert_eq!(field_type(&rep), "Vec<IdRef>");
        assert_eq!(accessor_type(&rep), "&[IdRef]");
    }
}
