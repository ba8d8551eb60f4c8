use super::formatter::{comma_join, fmtln, Formatter};
use super::{accessor_type, field_ident, field_type, OPCODE_ENUM};
use crate::model::{Cardinality, Model, Operand, Signature, CAPABILITY_KIND};

/// Constructors with more parameters than this get a clippy allowance.
const MAX_ARGS: usize = 7;

pub(super) fn generate(f: &mut Formatter, model: &Model) {
    generate_prelude(f, model);
    f.empty_line();
    generate_trait(f, model);
    for sig in &model.instructions {
        f.empty_line();
        generate_struct(f, sig);
        f.empty_line();
        generate_struct_impl(f, model, sig);
        f.empty_line();
        generate_trait_impl(f, model, sig);
        f.empty_line();
        f.add_block(&format!("impl From<{}> for Inst", sig.class_name), |f| {
            f.add_block(&format!("fn from(inst: {}) -> Self", sig.class_name), |f| {
                fmtln!(f, "Inst::{}(inst)", sig.name);
            });
        });
    }
    f.empty_line();
    generate_inst_enum(f, model);
}

/// Operand types: the id handle, literals, composites and tagged unions.
fn generate_prelude(f: &mut Formatter, model: &Model) {
    f.doc_comment("Handle of the instruction defining a result id.");
    fmtln!(f, "#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]");
    fmtln!(f, "pub struct InstRef(u32);");
    f.empty_line();
    f.add_block("impl InstRef", |f| {
        f.add_block("pub fn new(index: u32) -> Self", |f| {
            fmtln!(f, "InstRef(index)");
        });
        f.empty_line();
        f.add_block("pub fn index(self) -> u32", |f| {
            fmtln!(f, "self.0");
        });
    });
    f.empty_line();

    f.doc_comment(
        "A literal number whose width follows from the type of another operand.",
    );
    fmtln!(f, "#[derive(Clone, Copy, Debug, PartialEq)]");
    f.add_block("pub enum LiteralNumber", |f| {
        for (variant, ty) in [
            ("I8", "i8"),
            ("I16", "i16"),
            ("I32", "i32"),
            ("I64", "i64"),
            ("F32", "f32"),
            ("F64", "f64"),
        ] {
            fmtln!(f, "{variant}({ty}),");
        }
    });

    if !model.ids.is_empty() {
        f.empty_line();
    }
    for id in &model.ids {
        fmtln!(f, "pub type {id} = InstRef;");
    }
    if !model.literals.is_empty() {
        f.empty_line();
    }
    for (literal, repr) in &model.literals {
        fmtln!(f, "pub type {literal} = {repr};");
    }
    if !model.composites.is_empty() {
        f.empty_line();
    }
    for c in &model.composites {
        let bases = comma_join(c.bases.iter().map(String::as_str));
        fmtln!(f, "pub type {} = ({bases},);", c.name);
    }

    for union in &model.unions {
        let name = &union.name;
        let selector = &union.selector;
        f.empty_line();
        f.doc_comment(format!(
            "Payload selected by a preceding `{selector}` operand."
        ));
        fmtln!(f, "#[derive(Clone, Debug, PartialEq)]");
        f.add_block(&format!("pub enum {name}"), |f| {
            for case in &union.cases {
                let fields = comma_join(case.fields.iter().map(field_type));
                fmtln!(f, "{}({fields}),", case.name);
            }
        });
        f.empty_line();
        f.add_block(&format!("impl {name}"), |f| {
            f.doc_comment(format!("The `{selector}` value this payload belongs to."));
            f.add_block(&format!("pub fn selector(&self) -> {selector}"), |f| {
                if union.cases.is_empty() {
                    fmtln!(f, "match *self {{}}");
                } else {
                    f.add_block("match self", |f| {
                        for case in &union.cases {
                            fmtln!(f, "{name}::{0}(..) => {selector}::{0},", case.name);
                        }
                    });
                }
            });
        });
    }
}

/// `trait Instruction { ... }`
fn generate_trait(f: &mut Formatter, model: &Model) {
    f.doc_comment("Static properties shared by every instance of a record type.");
    f.add_block("pub trait Instruction", |f| {
        fmtln!(f, "const OPCODE: {OPCODE_ENUM};");
        f.doc_comment("Whether the instruction defines a result id.");
        fmtln!(f, "const HAS_RESULT: bool;");
        if model.has_capabilities() {
            fmtln!(
                f,
                "const REQUIRED_CAPABILITIES: &'static [{CAPABILITY_KIND}] = &[];"
            );
        }
    });
}

/// `struct <inst> { <field>: <type>, ... }`
fn generate_struct(f: &mut Formatter, sig: &Signature) {
    f.doc_comment(format!("`{}`", sig.class_name));
    fmtln!(f, "#[derive(Clone, Debug, PartialEq)]");
    if sig.fields.is_empty() {
        fmtln!(f, "pub struct {} {{}}", sig.class_name);
        return;
    }
    f.add_block(&format!("pub struct {}", sig.class_name), |f| {
        for field in &sig.fields {
            fmtln!(f, "{}: {},", field_ident(field), field_type(field));
        }
    });
}

/// Pairs of `(selector field, payload field)` where the payload is a tagged
/// union chosen by the single enum operand right before it.
fn selected_payloads<'a>(model: &Model, sig: &'a Signature) -> Vec<(&'a Operand, &'a Operand)> {
    sig.fields
        .windows(2)
        .map(|pair| (&pair[0], &pair[1]))
        .filter(|(selector, payload)| {
            selector.cardinality == Cardinality::One
                && payload.cardinality != Cardinality::Repeated
                && model
                    .unions
                    .iter()
                    .any(|u| u.name == payload.kind && u.selector == selector.kind)
        })
        .collect()
}

/// `impl <inst> { fn new(...), <accessors> }`
fn generate_struct_impl(f: &mut Formatter, model: &Model, sig: &Signature) {
    f.add_block(&format!("impl {}", sig.class_name), |f| {
        let params = comma_join(
            sig.fields
                .iter()
                .map(|o| format!("{}: {}", field_ident(o), field_type(o))),
        );
        let args = comma_join(sig.fields.iter().map(field_ident));
        if sig.fields.len() > MAX_ARGS {
            fmtln!(f, "#[allow(clippy::too_many_arguments, reason = \"one parameter per operand\")]");
        }
        fmtln!(f, "#[must_use]");
        f.add_block(&format!("pub fn new({params}) -> Self"), |f| {
            for (selector, payload) in selected_payloads(model, sig) {
                let selector = field_ident(selector);
                let ident = field_ident(payload);
                let message = format!("`{ident}` does not match `{selector}`");
                if payload.cardinality == Cardinality::Optional {
                    f.add_block(&format!("if let Some(payload) = &{ident}"), |f| {
                        fmtln!(f, "debug_assert_eq!(payload.selector(), {selector}, \"{message}\");");
                    });
                } else {
                    fmtln!(f, "debug_assert_eq!({ident}.selector(), {selector}, \"{message}\");");
                }
            }
            if args.is_empty() {
                fmtln!(f, "Self {{}}");
            } else {
                fmtln!(f, "Self {{ {args} }}");
            }
        });

        for field in &sig.fields {
            let ident = field_ident(field);
            let ty = accessor_type(field);
            f.empty_line();
            f.add_block(&format!("pub fn {ident}(&self) -> {ty}"), |f| {
                match field.cardinality {
                    Cardinality::One | Cardinality::Repeated => fmtln!(f, "&self.{ident}"),
                    Cardinality::Optional => fmtln!(f, "self.{ident}.as_ref()"),
                }
            });
        }
    });
}

/// `impl Instruction for <inst> { ... }`
fn generate_trait_impl(f: &mut Formatter, model: &Model, sig: &Signature) {
    f.add_block(&format!("impl Instruction for {}", sig.class_name), |f| {
        fmtln!(f, "const OPCODE: {OPCODE_ENUM} = {OPCODE_ENUM}::{};", sig.name);
        fmtln!(f, "const HAS_RESULT: bool = {};", sig.has_result);
        if model.has_capabilities() && !sig.capabilities.is_empty() {
            let caps = comma_join(
                sig.capabilities
                    .iter()
                    .map(|c| format!("{CAPABILITY_KIND}::{c}")),
            );
            fmtln!(
                f,
                "const REQUIRED_CAPABILITIES: &'static [{CAPABILITY_KIND}] = &[{caps}];"
            );
        }
    });
}

/// `enum Inst { ... }` over every record type.
fn generate_inst_enum(f: &mut Formatter, model: &Model) {
    f.doc_comment("Any instruction of the generated set.");
    fmtln!(f, "#[derive(Clone, Debug, PartialEq)]");
    f.add_block("pub enum Inst", |f| {
        for sig in &model.instructions {
            fmtln!(f, "{}({}),", sig.name, sig.class_name);
        }
    });
    f.empty_line();

    let dispatch = |f: &mut Formatter, constant: &str| {
        if model.instructions.is_empty() {
            fmtln!(f, "match *self {{}}");
            return;
        }
        f.add_block("match self", |f| {
            for sig in &model.instructions {
                fmtln!(f, "Inst::{}(_) => {}::{constant},", sig.name, sig.class_name);
            }
        });
    };
    f.add_block("impl Inst", |f| {
        f.add_block(&format!("pub fn opcode(&self) -> {OPCODE_ENUM}"), |f| {
            dispatch(f, "OPCODE");
        });
        f.empty_line();
        f.add_block("pub fn has_result(&self) -> bool", |f| {
            dispatch(f, "HAS_RESULT");
        });
        if model.has_capabilities() {
            f.empty_line();
            f.add_block(
                &format!("pub fn required_capabilities(&self) -> &'static [{CAPABILITY_KIND}]"),
                |f| dispatch(f, "REQUIRED_CAPABILITIES"),
            );
        }
    });
}
