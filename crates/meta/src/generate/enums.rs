use super::formatter::{fmtln, Formatter};
use super::OPCODE_ENUM;
use crate::model::{Category, KindEnum, Model, OpcodeTable};

/// One enumerator: identifier, discriminant as spelled, value.
pub(super) struct Variant<'a> {
    pub name: &'a str,
    pub literal: String,
    pub value: u32,
}

/// The parts of a generated `#[repr(u32)]` enum.
pub(super) struct EnumDef<'a> {
    pub name: &'a str,
    pub doc: String,
    pub variants: Vec<Variant<'a>>,
    /// `(alias, canonical)` pairs, emitted as associated constants.
    pub aliases: Vec<(&'a str, &'a str)>,
    /// Whether some enumerator keeps a spelling rustc does not accept as
    /// upper camel case (`sRGB`, `OpenCL_C`, `acos`).
    pub raw_case: bool,
}

/// Whether rustc's `non_camel_case_types` lint accepts `name`.
fn is_upper_camel(name: &str) -> bool {
    !name.starts_with(|c: char| c.is_ascii_lowercase()) && !name.contains('_')
}

impl<'a> EnumDef<'a> {
    pub fn opcodes(name: &'a str, doc: String, table: &'a OpcodeTable) -> Self {
        EnumDef {
            name,
            doc,
            variants: table
                .iter()
                .map(|(name, value)| Variant {
                    name,
                    literal: value.to_string(),
                    value,
                })
                .collect(),
            aliases: table.aliases().collect(),
            raw_case: table.iter().any(|(name, _)| !is_upper_camel(name)),
        }
    }

    fn kind(e: &'a KindEnum) -> Self {
        let doc = match e.category {
            Category::BitEnum => format!("Single flags of the `{}` bit enum.", e.name),
            _ => format!("Values of the `{}` operand kind.", e.name),
        };
        EnumDef {
            name: &e.name,
            doc,
            variants: e
                .variants
                .iter()
                .map(|v| Variant {
                    name: &v.name,
                    literal: v.literal.clone(),
                    value: v.value,
                })
                .collect(),
            aliases: e
                .aliases
                .iter()
                .map(|(a, c)| (a.as_str(), c.as_str()))
                .collect(),
            raw_case: e.variants.iter().any(|v| !is_upper_camel(&v.name)),
        }
    }
}

pub(super) fn generate(f: &mut Formatter, model: &Model) {
    let op = EnumDef::opcodes(
        OPCODE_ENUM,
        "Opcodes of the generated instruction set.".to_string(),
        &model.opcodes,
    );
    generate_enum(f, &op);
    for e in &model.enums {
        f.empty_line();
        generate_enum(f, &EnumDef::kind(e));
    }
}

/// `pub enum <name> { ... }` with its conversions.
pub(super) fn generate_enum(f: &mut Formatter, def: &EnumDef) {
    let name = def.name;
    f.doc_comment(&def.doc);
    if def.raw_case {
        fmtln!(f, "#[allow(non_camel_case_types, reason = \"grammar spelling\")]");
    }
    fmtln!(f, "#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]");
    // `repr` is rejected on enums without variants.
    if !def.variants.is_empty() {
        fmtln!(f, "#[repr(u32)]");
    }
    f.add_block(&format!("pub enum {name}"), |f| {
        for v in &def.variants {
            fmtln!(f, "{} = {},", v.name, v.literal);
        }
    });
    f.empty_line();

    f.add_block(&format!("impl {name}"), |f| {
        f.doc_comment("Every enumerator, in declaration order.");
        if def.variants.is_empty() {
            fmtln!(f, "pub const ALL: &'static [{name}] = &[];");
        } else {
            fmtln!(f, "pub const ALL: &'static [{name}] = &[");
            f.indent(|f| {
                for v in &def.variants {
                    fmtln!(f, "{name}::{},", v.name);
                }
            });
            fmtln!(f, "];");
        }
        f.empty_line();

        f.doc_comment("The enumerator whose discriminant is `value`.");
        f.add_block("pub fn from_u32(value: u32) -> Option<Self>", |f| {
            if def.variants.is_empty() {
                fmtln!(f, "let _ = value;");
                fmtln!(f, "None");
            } else {
                f.add_block("match value", |f| {
                    for v in &def.variants {
                        fmtln!(f, "{} => Some({name}::{}),", v.literal, v.name);
                    }
                    fmtln!(f, "_ => None,");
                });
            }
        });
        f.empty_line();

        f.add_block("pub fn as_u32(self) -> u32", |f| {
            if def.variants.is_empty() {
                fmtln!(f, "match self {{}}");
            } else {
                fmtln!(f, "self as u32");
            }
        });
    });

    if !def.aliases.is_empty() {
        f.empty_line();
        fmtln!(f, "#[allow(non_upper_case_globals, reason = \"grammar spelling\")]");
        f.add_block(&format!("impl {name}"), |f| {
            for (alias, canonical) in &def.aliases {
                fmtln!(f, "pub const {alias}: {name} = {name}::{canonical};");
            }
        });
    }
    f.empty_line();

    f.add_block(&format!("impl From<{name}> for u32"), |f| {
        f.add_block(&format!("fn from(value: {name}) -> u32"), |f| {
            fmtln!(f, "value.as_u32()");
        });
    });
}

#[cfg(test)]
mod tests {
    use super::super::tests::model;
    use super::super::emit_enums;

    #[test]
    fn opcode_enum() {
        let body = emit_enums(&model()).body;
        assert!(body.starts_with(
            "/// Opcodes of the generated instruction set.\n\
             #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]\n\
             #[repr(u32)]\n\
             pub enum Op {\n    \
                 Nop = 0,\n    \
                 Undef = 1,\n    \
                 TypeImage = 25,\n"
        ));
        assert!(body.contains("    SubgroupBlockReadINTEL = 5575,\n}\n"));
        assert!(body.contains("            5575 => Some(Op::SubgroupBlockReadINTEL),\n"));
    }

    #[test]
    fn kind_enums_keep_declared_spelling() {
        let body = emit_enums(&model()).body;
        assert!(body.contains("pub enum Dim {\n    Dim1D = 0,\n    Dim2D = 1,\n    Cube = 3,\n}"));
        assert!(body.contains("    Volatile = 0x0001,\n"));
        assert!(body.contains("            0x0002 => Some(MemoryAccess::Aligned),\n"));
    }

    #[test]
    fn aliases_become_constants() {
        let body = emit_enums(&model()).body;
        assert!(body.contains(
            "#[allow(non_upper_case_globals, reason = \"grammar spelling\")]\n\
             impl Capability {\n    \
                 pub const SubgroupBlockIO: Capability = Capability::SubgroupBufferBlockIOINTEL;\n\
             }\n"
        ));
    }

    #[test]
    fn grammar_spelling_is_allowed_per_enum() {
        let body = emit_enums(&model()).body;
        assert!(body.contains(
            "/// Values of the `ImageChannelOrder` operand kind.\n\
             #[allow(non_camel_case_types, reason = \"grammar spelling\")]\n\
             #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]\n\
             #[repr(u32)]\n\
             pub enum ImageChannelOrder {\n    \
                 R = 0,\n    \
                 sRGB = 13,\n"
        ));
        assert!(body.contains(
            "/// Values of the `Dim` operand kind.\n\
             #[derive("
        ));
        assert!(!body.starts_with("/// Opcodes of the generated instruction set.\n#[allow"));
    }

    #[test]
    fn camel_case_check() {
        assert!(super::is_upper_camel("Dim1D"));
        assert!(super::is_upper_camel("SubgroupBufferBlockIOINTEL"));
        assert!(!super::is_upper_camel("sRGB"));
        assert!(!super::is_upper_camel("OpenCL_C"));
        assert!(!super::is_upper_camel("acos"));
    }

    #[test]
    fn empty_enum_has_no_repr() {
        let body = emit_enums(&model()).body;
        let start = body.find("pub enum AccessQualifier {").unwrap();
        let before = &body[..start];
        assert!(!before.ends_with("#[repr(u32)]\n"));
        assert!(body[start..].contains("pub const ALL: &'static [AccessQualifier] = &[];"));
        assert!(body[start..].contains("        match self {}\n"));
    }
}
