use super::enums::{EnumDef, Variant};
use super::formatter::{fmtln, Formatter};
use super::{snake, OPCODE_ENUM};
use crate::model::Model;

pub(super) fn generate(f: &mut Formatter, model: &Model) {
    let op = EnumDef::opcodes(OPCODE_ENUM, String::new(), &model.opcodes);
    generate_name_table(f, &op, "op_name", "opcode");
    for e in &model.enums {
        f.empty_line();
        let variants: Vec<_> = e
            .variants
            .iter()
            .map(|v| Variant {
                name: &v.name,
                literal: v.literal.clone(),
                value: v.value,
            })
            .collect();
        let def = EnumDef {
            name: &e.name,
            doc: String::new(),
            variants,
            aliases: Vec::new(),
            raw_case: false,
        };
        let function = format!("{}_name", snake(&e.name));
        generate_name_table(f, &def, &function, &format!("`{}` value", e.name));
    }
}

/// `fn <function>(value: u32) -> &'static str`, plus `name()` and `Display`
/// on the typed enum.
pub(super) fn generate_name_table(f: &mut Formatter, def: &EnumDef, function: &str, what: &str) {
    let name = def.name;
    f.doc_comment(format!("Name of the {what} `value`, or `\"unknown\"`."));
    f.add_block(&format!("pub fn {function}(value: u32) -> &'static str"), |f| {
        if def.variants.is_empty() {
            fmtln!(f, "let _ = value;");
            fmtln!(f, "\"unknown\"");
        } else {
            f.add_block("match value", |f| {
                for v in &def.variants {
                    fmtln!(f, "{} => \"{}\",", v.literal, v.name);
                }
                fmtln!(f, "_ => \"unknown\",");
            });
        }
    });
    f.empty_line();

    f.add_block(&format!("impl {name}"), |f| {
        f.add_block("pub fn name(self) -> &'static str", |f| {
            fmtln!(f, "{function}(self.as_u32())");
        });
    });
    f.empty_line();

    f.add_block(&format!("impl core::fmt::Display for {name}"), |f| {
        f.add_block(
            "fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result",
            |f| {
                fmtln!(f, "f.write_str(self.name())");
            },
        );
    });
}
