use std::collections::{BTreeSet, HashSet};

use serde::{ser::SerializeStruct, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::{
    error::SercError,
    init_value::{Argument, InitialValue},
    types::{TypeDescriptor, TypeResolver},
    utils::{is_identifier, node_kind, optional_str, quote},
};

/// Headers every generated file needs regardless of its members:
/// `memcpy`, `uint8_t`, `malloc`/`free` and `ssize_t`.
pub const BASELINE_HEADERS: [&str; 4] = ["string.h", "stdint.h", "stdlib.h", "sys/types.h"];

/// Parameter and local names used by the generated functions.
pub const RESERVED_NAMES: [&str; 7] =
    ["this", "this_ptr", "block", "buffer", "max_length", "offset", "alloc_ret"];

/// C11 keywords; none of them may name a structure, typedef or member.
pub const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof", "_Atomic", "_Bool",
    "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert", "_Thread_local",
];

fn check_identifier(what: &str, name: &str) -> Result<(), SercError> {
    if !is_identifier(name) {
        return Err(SercError::parse(format!("{} {} is not a valid C identifier", what, quote(name))));
    }
    if C_KEYWORDS.contains(&name) {
        return Err(SercError::parse(format!("{} {} is a C keyword", what, quote(name))));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct Member {
    pub name:           String,
    #[serde(rename = "type", serialize_with = "serialize_descriptor")]
    pub ty:             Box<dyn TypeDescriptor>,
    pub long_comment:   Option<String>,
    pub inline_comment: Option<String>,
    pub init:           InitialValue,
}

fn serialize_descriptor<S: Serializer>(
    ty: &Box<dyn TypeDescriptor>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("TypeDescriptor", 3)?;
    state.serialize_field("type_id", ty.type_id())?;
    state.serialize_field("c_type", &ty.c_type())?;
    state.serialize_field("size", &ty.size_expr())?;
    state.end()
}

impl Member {
    /// Parses one entry of a structure's `contents` list.
    pub fn parse(node: &Value, resolver: &TypeResolver<'_>) -> Result<Member, SercError> {
        let node = match node {
            Value::Object(map) => map,
            other => {
                return Err(SercError::parse(format!(
                    "Member definitions must be dictionaries, found a {}",
                    node_kind(other)
                )))
            }
        };

        let name = match node.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => return Err(SercError::parse("All members must have a name")),
        };

        Member::parse_named(node, &name, resolver).map_err(|e| e.at_member(&name))
    }

    fn parse_named(
        node: &Map<String, Value>,
        name: &str,
        resolver: &TypeResolver<'_>,
    ) -> Result<Member, SercError> {
        check_identifier("Member name", name)?;
        if RESERVED_NAMES.contains(&name) {
            return Err(SercError::parse(format!(
                "Member name {} is reserved by the generated functions",
                quote(name)
            )));
        }

        let type_node = node
            .get("type")
            .ok_or_else(|| SercError::parse("All member variables must have a type"))?;
        let mut ty = resolver.resolve(type_node)?;

        let long_comment = optional_str(node, "long_comment", "long_comment")?.map(str::to_string);
        let inline_comment = optional_str(node, "inline_comment", "inline_comment")?.map(str::to_string);

        ty.parse_member(node)?;
        let init = InitialValue::resolve(node, ty.as_ref(), name)?;

        trace!(member = name, c_type = %ty.c_type(), "resolved member");
        Ok(Member {
            name: name.to_string(),
            ty,
            long_comment,
            inline_comment,
            init,
        })
    }

    pub fn c_type(&self) -> String {
        self.ty.c_type()
    }

    pub fn size_expr(&self) -> String {
        self.ty.size_expr()
    }

    pub fn required_headers(&self) -> Vec<&'static str> {
        self.ty.required_headers()
    }

    pub fn required_arguments(&self) -> Vec<Argument> {
        self.init.arguments()
    }

    pub fn constructor_lines(&self) -> Vec<String> {
        self.ty.constructor_lines(&self.name, &self.init)
    }

    /// The field declaration lines, long comment first.
    pub fn declaration_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(comment) = &self.long_comment {
            lines.push("    /*".to_string());
            lines.push(format!("     * {}", comment));
            lines.push("     */".to_string());
        }
        let mut line = format!("    {} {};", self.c_type(), self.name);
        if let Some(comment) = &self.inline_comment {
            line.push_str(&format!(" /* {} */", comment));
        }
        lines.push(line);
        lines
    }
}

/// One compiled record definition. Member order is both the field layout
/// and the serializer's byte order.
#[derive(Debug, Serialize)]
pub struct Structure {
    pub type_name:    String,
    pub typedef_name: Option<String>,
    pub members:      Vec<Member>,
}

impl Structure {
    /// Compiles one entry of `struct_list`. Fails as a whole: no partially
    /// parsed structure is ever returned.
    pub fn compile(node: &Value, resolver: &TypeResolver<'_>) -> Result<Structure, SercError> {
        let node = match node {
            Value::Object(map) => map,
            other => {
                return Err(SercError::parse(format!(
                    "Structure definitions must be dictionaries, found a {}",
                    node_kind(other)
                )))
            }
        };

        let type_name = match node.get("type_name") {
            Some(Value::String(name)) => name.clone(),
            _ => return Err(SercError::parse("Structure definitions must have a type_name")),
        };

        Structure::compile_named(node, &type_name, resolver).map_err(|e| e.at_structure(&type_name))
    }

    fn compile_named(
        node: &Map<String, Value>,
        type_name: &str,
        resolver: &TypeResolver<'_>,
    ) -> Result<Structure, SercError> {
        check_identifier("Structure type_name", type_name)?;

        let contents = match node.get("contents") {
            Some(Value::Array(contents)) => contents,
            _ => {
                return Err(SercError::parse(
                    "Structures must have a contents list, even if there are no members",
                ))
            }
        };

        let mut members: Vec<Member> = Vec::with_capacity(contents.len());
        let mut seen = HashSet::new();
        for member_node in contents {
            let member = Member::parse(member_node, resolver)?;
            if !seen.insert(member.name.clone()) {
                return Err(SercError::parse(format!(
                    "The member {} is declared twice",
                    quote(&member.name)
                ))
                .at_member(&member.name));
            }
            members.push(member);
        }

        let typedef_name = optional_str(node, "typedef_name", "Structure typedef names")?;
        if let Some(alias) = typedef_name {
            check_identifier("Structure typedef name", alias)?;
        }

        debug!(structure = type_name, members = members.len(), "compiled structure");
        Ok(Structure {
            type_name: type_name.to_string(),
            typedef_name: typedef_name.map(str::to_string),
            members,
        })
    }

    /// Union of the member headers plus [`BASELINE_HEADERS`].
    pub fn required_headers(&self) -> BTreeSet<&'static str> {
        let mut headers: BTreeSet<&'static str> = BASELINE_HEADERS.iter().copied().collect();
        for member in &self.members {
            headers.extend(member.required_headers());
        }
        headers
    }

    /// Constructor parameters contributed by the members, in member order.
    pub fn member_arguments(&self) -> Vec<Argument> {
        self.members.iter().flat_map(Member::required_arguments).collect()
    }

    /// The full constructor parameter list: `this` followed by
    /// [`Structure::member_arguments`].
    pub fn required_arguments(&self) -> Vec<Argument> {
        let mut args = vec![Argument::new(self.pointer_type(), "this")];
        args.extend(self.member_arguments());
        args
    }

    pub fn c_type(&self) -> String {
        format!("struct {}", self.type_name)
    }

    pub fn pointer_type(&self) -> String {
        format!("struct {}*", self.type_name)
    }
}
