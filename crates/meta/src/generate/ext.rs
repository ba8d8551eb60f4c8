use super::enums::{generate_enum, EnumDef};
use super::formatter::{fmtln, Formatter};
use super::names::generate_name_table;
use crate::model::ExtModel;
use heck::ToShoutySnakeCase;

pub(super) fn generate(f: &mut Formatter, model: &ExtModel) {
    let name = &model.name;
    f.doc_comment(format!("Name under which `{name}` is imported."));
    fmtln!(
        f,
        "pub const {}_IMPORT_NAME: &str = \"{name}\";",
        model.module_name.to_shouty_snake_case()
    );
    f.empty_line();

    let mut def = EnumDef::opcodes(
        &model.type_name,
        format!("Instructions of the `{name}` extended instruction set."),
        &model.opcodes,
    );
    generate_enum(f, &def);
    f.empty_line();

    def.aliases.clear();
    let function = format!("{}_name", model.module_name);
    generate_name_table(f, &def, &function, &format!("`{name}` instruction"));
}
