use super::formatter::{fmtln, Formatter};
use super::{field_ident, snake, OPCODE_ENUM};
use crate::model::{Cardinality, Category, Model};

pub(super) fn generate(f: &mut Formatter, model: &Model) {
    generate_inst_visitor(f, model);
    f.empty_line();
    generate_opcode_of(f);
    f.empty_line();
    generate_operand_visitor(f, model);
    f.empty_line();
    generate_walk(f, model);
}

fn visit_method(record: &str) -> String {
    format!("visit_{}", snake(record))
}

/// `trait InstVisitor` and `fn visit`.
fn generate_inst_visitor(f: &mut Formatter, model: &Model) {
    f.doc_comment("A handler for every instruction record.");
    f.add_block("pub trait InstVisitor", |f| {
        fmtln!(f, "type Output;");
        for sig in &model.instructions {
            fmtln!(
                f,
                "fn {}(&mut self, inst: &{}) -> Self::Output;",
                visit_method(&sig.name),
                sig.class_name
            );
        }
    });
    f.empty_line();

    f.doc_comment("Call the handler of `visitor` matching the record held by `inst`.");
    f.add_block(
        "pub fn visit<V: InstVisitor + ?Sized>(visitor: &mut V, inst: &Inst) -> V::Output",
        |f| {
            if model.instructions.is_empty() {
                fmtln!(f, "let _ = visitor;");
                fmtln!(f, "match *inst {{}}");
                return;
            }
            f.add_block("match inst", |f| {
                for sig in &model.instructions {
                    fmtln!(
                        f,
                        "Inst::{}(inst) => visitor.{}(inst),",
                        sig.name,
                        visit_method(&sig.name)
                    );
                }
            });
        },
    );
}

/// `fn opcode_of(tag: u32) -> Op`
fn generate_opcode_of(f: &mut Formatter) {
    f.doc_comment(
        "The opcode with numeric value `tag`.\n\n\
         # Panics\n\n\
         Panics if `tag` is not the opcode of a generated instruction.",
    );
    f.add_block(&format!("pub fn opcode_of(tag: u32) -> {OPCODE_ENUM}"), |f| {
        f.add_block(&format!("match {OPCODE_ENUM}::from_u32(tag)"), |f| {
            fmtln!(f, "Some(op) => op,");
            fmtln!(
                f,
                "None => panic!(\"opcode {{tag}} is not part of the generated instruction set\"),"
            );
        });
    });
}

/// `trait OperandVisitor` with one defaulted callback per operand kind.
fn generate_operand_visitor(f: &mut Formatter, model: &Model) {
    f.doc_comment(
        "Callbacks for the operands of an instruction, in declaration order.\n\n\
         Every callback does nothing by default; `Id` operands default to\n\
         [`OperandVisitor::visit_id`].",
    );
    f.add_block("pub trait OperandVisitor", |f| {
        f.doc_comment("Called once per instruction, before any of its operands.");
        f.add_block("fn pre_visit(&mut self, inst: &Inst)", |f| {
            fmtln!(f, "let _ = inst;");
        });
        f.empty_line();
        f.doc_comment("Shared callback of every `Id` operand.");
        f.add_block("fn visit_id(&mut self, id: &InstRef)", |f| {
            fmtln!(f, "let _ = id;");
        });
        for kind in model.field_kinds() {
            f.empty_line();
            let method = visit_method(kind);
            f.add_block(&format!("fn {method}(&mut self, value: &{kind})"), |f| {
                if model.category(kind) == Some(Category::Id) {
                    fmtln!(f, "self.visit_id(value);");
                } else {
                    fmtln!(f, "let _ = value;");
                }
            });
        }
    });
}

/// `fn walk_operands`
fn generate_walk(f: &mut Formatter, model: &Model) {
    f.doc_comment(
        "Call [`OperandVisitor::pre_visit`] and then the callback of every\n\
         operand of `inst`: once for a required operand, once if present for an\n\
         optional one, and once per element, in order, for a repeated one.",
    );
    f.add_block(
        "pub fn walk_operands<V: OperandVisitor + ?Sized>(visitor: &mut V, inst: &Inst)",
        |f| {
            fmtln!(f, "visitor.pre_visit(inst);");
            if model.instructions.is_empty() {
                fmtln!(f, "match *inst {{}}");
                return;
            }
            f.add_block("match inst", |f| {
                for sig in &model.instructions {
                    if sig.fields.is_empty() {
                        fmtln!(f, "Inst::{}(_) => {{}}", sig.name);
                        continue;
                    }
                    f.add_block(&format!("Inst::{}(inst) =>", sig.name), |f| {
                        for field in &sig.fields {
                            let method = visit_method(&field.kind);
                            let ident = field_ident(field);
                            match field.cardinality {
                                Cardinality::One => {
                                    fmtln!(f, "visitor.{method}(inst.{ident}());");
                                }
                                Cardinality::Optional => {
                                    f.add_block(&format!("if let Some(value) = inst.{ident}()"), |f| {
                                        fmtln!(f, "visitor.{method}(value);");
                                    });
                                }
                                Cardinality::Repeated => {
                                    f.add_block(&format!("for value in inst.{ident}()"), |f| {
                                        fmtln!(f, "visitor.{method}(value);");
                                    });
                                }
                            }
                        }
                    });
                }
            });
        },
    );
}

#[cfg(test)]
mod tests {
    use super::super::emit_visitor;
    use super::super::tests::model;

    #[test]
    fn one_arm_per_record_and_no_fallback() {
        let model = model();
        let body = emit_visitor(&model).body;
        let visit = &body[body.find("pub fn visit<").unwrap()..body.find("pub fn opcode_of").unwrap()];
        assert_eq!(visit.matches("=> visitor.visit_").count(), model.instructions.len());
        assert!(!visit.contains("_ =>"));
        assert!(body.contains("    fn visit_subgroup_block_read_intel(&mut self, inst: &OpSubgroupBlockReadINTEL) -> Self::Output;\n"));
    }

    #[test]
    fn operand_callbacks_default_by_category() {
        let body = emit_visitor(&model()).body;
        assert!(body.contains("    fn visit_id_ref(&mut self, value: &IdRef) {\n        self.visit_id(value);\n"));
        assert!(body.contains("    fn visit_dim(&mut self, value: &Dim) {\n        let _ = value;\n"));
        assert!(body.contains("    fn visit_decoration_attr(&mut self, value: &DecorationAttr) {"));
        assert!(!body.contains("fn visit_id_result("));
    }

    #[test]
    fn walk_honours_cardinality() {
        let body = emit_visitor(&model()).body;
        assert!(body.contains(
            "        Inst::Load(inst) => {\n            \
                 visitor.visit_id_result_type(inst.ty());\n            \
                 visitor.visit_id_ref(inst.op0());\n            \
                 if let Some(value) = inst.op1() {\n                \
                     visitor.visit_memory_access(value);\n            \
                 }\n        \
             }\n"
        ));
        assert!(body.contains(
            "            for value in inst.op0() {\n                \
                 visitor.visit_pair_id_ref_id_ref(value);\n"
        ));
        assert!(body.contains("        Inst::Nop(_) => {}\n"));
    }
}
