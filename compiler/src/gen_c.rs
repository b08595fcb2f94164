//! C source emission.
//!
//! Output is a fixed sequence of passes over the compiled structures:
//! includes, prototypes, declarations, size functions, allocators,
//! constructors, `new` wrappers and serializers. Every structure's artifact
//! for one pass is emitted before the next pass starts. The passes never
//! fail; all validation happened while compiling.

use crate::{
    compiler::CompiledSchema,
    init_value::Argument,
    structure::Structure,
};

fn format_parameters(args: &[Argument]) -> String {
    args.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Generates the complete C source for a compiled schema.
pub fn generate_c(schema: &CompiledSchema) -> String {
    let mut c_code: Vec<String> = Vec::new();

    for header in schema.required_headers() {
        c_code.push(format!("#include <{}>", header));
    }
    c_code.push("".to_string());

    for structure in &schema.structures {
        c_code.push(format_prototype(structure));
    }
    c_code.push("".to_string());

    let passes: [fn(&Structure) -> String; 6] = [
        format_declaration,
        format_size,
        format_allocate,
        format_constructor,
        format_new,
        format_serializer,
    ];
    for pass in passes {
        for structure in &schema.structures {
            c_code.push(pass(structure));
            c_code.push("".to_string());
        }
    }

    c_code.join("\n")
}

pub fn format_prototype(structure: &Structure) -> String {
    format!("{};", structure.c_type())
}

/// The packed struct definition, followed by the typedef if one was given.
pub fn format_declaration(structure: &Structure) -> String {
    let mut lines = vec![format!("{} {{", structure.c_type())];
    for member in &structure.members {
        lines.extend(member.declaration_lines());
    }
    lines.push("}__attribute__((packed));".to_string());

    if let Some(alias) = &structure.typedef_name {
        lines.push(format!("typedef {} {};", structure.c_type(), alias));
    }
    lines.join("\n")
}

pub fn format_size(structure: &Structure) -> String {
    let sizes: Vec<String> = structure.members.iter().map(|m| m.size_expr()).collect();
    let total = if sizes.is_empty() { "0".to_string() } else { sizes.join(" + ") };
    [
        format!("size_t {}_size({} this) {{", structure.type_name, structure.pointer_type()),
        format!("    return ({});", total),
        "}".to_string(),
    ]
    .join("\n")
}

pub fn format_allocate(structure: &Structure) -> String {
    let name = &structure.type_name;
    let c_type = structure.c_type();
    [
        format!("ssize_t {}_allocate({}* block) {{", name, structure.pointer_type()),
        format!("    *block = malloc(sizeof({}));", c_type),
        "    if (*block == NULL) {".to_string(),
        "        return -1;".to_string(),
        "    }".to_string(),
        format!("    return sizeof({});", c_type),
        "}".to_string(),
    ]
    .join("\n")
}

pub fn format_constructor(structure: &Structure) -> String {
    let mut lines = vec![format!(
        "int {}_construct({}) {{",
        structure.type_name,
        format_parameters(&structure.required_arguments())
    )];
    for member in &structure.members {
        lines.extend(member.constructor_lines());
    }
    lines.push("    return 0;".to_string());
    lines.push("}".to_string());
    lines.join("\n")
}

/// Allocate followed by construct. A failed construct frees the structure's
/// own block and nulls `*this_ptr`; list buffers the constructor allocated
/// before failing are not released.
pub fn format_new(structure: &Structure) -> String {
    let name = &structure.type_name;
    let member_args = structure.member_arguments();

    let mut params = vec![Argument::new(format!("{}*", structure.pointer_type()), "this_ptr")];
    params.extend(member_args.iter().cloned());

    let mut call_args = vec!["*this_ptr".to_string()];
    call_args.extend(member_args.into_iter().map(|arg| arg.name));

    [
        format!("ssize_t {}_new({}) {{", name, format_parameters(&params)),
        format!("    ssize_t alloc_ret = {}_allocate(this_ptr);", name),
        "    if (alloc_ret < 0) {".to_string(),
        "        return -1;".to_string(),
        "    }".to_string(),
        format!("    if ({}_construct({}) < 0) {{", name, call_args.join(", ")),
        "        free(*this_ptr);".to_string(),
        "        *this_ptr = NULL;".to_string(),
        "        return -1;".to_string(),
        "    }".to_string(),
        "    return alloc_ret;".to_string(),
        "}".to_string(),
    ]
    .join("\n")
}

/// Fills a structure from a flat buffer, member by member in declaration
/// order, refusing to read past `max_length`.
pub fn format_serializer(structure: &Structure) -> String {
    let mut lines = vec![
        format!(
            "int {}_serialize(uint8_t* buffer, int max_length, {} this) {{",
            structure.type_name,
            structure.pointer_type()
        ),
        "    size_t offset = 0;".to_string(),
        "    if (max_length < 0) {".to_string(),
        "        return -1;".to_string(),
        "    }".to_string(),
    ];
    for member in &structure.members {
        let size = member.size_expr();
        lines.push("".to_string());
        lines.push(format!("    if (offset + {} > (size_t)max_length) {{", size));
        lines.push("        return -1;".to_string());
        lines.push("    }".to_string());
        lines.push(format!(
            "    memcpy({}, &(buffer[offset]), {});",
            member.ty.field_address(&member.name),
            size
        ));
        lines.push(format!("    offset += {};", size));
    }
    lines.push("".to_string());
    lines.push("    return 0;".to_string());
    lines.push("}".to_string());
    lines.join("\n")
}
