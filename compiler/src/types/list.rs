use serde_json::{Map, Value};

use crate::{
    args::{bind, Param, TypeArgs},
    error::SercError,
    init_value::InitialValue,
    registry::TypeRegistry,
    types::{InitStrategy, TypeDescriptor, TypeResolver},
    utils::node_kind,
};

pub const VECTOR_ID: &str = "vector";
pub const MALLOC_LIST_ID: &str = "malloc_list";

static PARAMS: [Param; 2] = [
    Param::optional("element_type").alias("elementTypeNode"),
    Param::optional("list_length"),
];

/// Heap allocated C arrays. The member is a pointer to the element type and
/// the generated constructor mallocs `list_length` elements.
///
/// `list_length` is C source text, never evaluated here: it may name another
/// field or be any expression valid where the size is used.
#[derive(Debug)]
pub struct ListType {
    pub type_id: &'static str,
    pub element: Box<dyn TypeDescriptor>,
    pub length:  Option<String>,
}

fn length_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        _ => None,
    }
}

fn construct(
    type_id: &'static str,
    args: &TypeArgs,
    resolver: &TypeResolver<'_>,
) -> Result<Box<dyn TypeDescriptor>, SercError> {
    let bound = bind(type_id, &PARAMS, args)?;

    let default_element = Value::String("int".to_string());
    let element = resolver.resolve(bound.get("element_type").unwrap_or(&default_element))?;
    element.check_element()?;

    let length = match bound.get("list_length") {
        None => None,
        Some(value) => Some(length_text(value).ok_or_else(|| {
            SercError::type_args(
                type_id,
                format!("list_length must be a non-empty string or a non-negative integer, not {}", value),
            )
        })?),
    };

    Ok(Box::new(ListType { type_id, element, length }))
}

impl ListType {
    pub fn new_vector(args: &TypeArgs, resolver: &TypeResolver<'_>) -> Result<Box<dyn TypeDescriptor>, SercError> {
        construct(VECTOR_ID, args, resolver)
    }

    pub fn new_malloc_list(args: &TypeArgs, resolver: &TypeResolver<'_>) -> Result<Box<dyn TypeDescriptor>, SercError> {
        construct(MALLOC_LIST_ID, args, resolver)
    }

    fn length(&self) -> &str {
        self.length.as_deref().unwrap_or("0")
    }
}

impl TypeDescriptor for ListType {
    fn type_id(&self) -> &'static str {
        self.type_id
    }

    fn c_type(&self) -> String {
        format!("{}*", self.element.c_type())
    }

    fn required_headers(&self) -> Vec<&'static str> {
        let mut headers = vec!["stdlib.h"];
        headers.extend(self.element.required_headers());
        headers
    }

    fn size_expr(&self) -> String {
        format!("({} * {})", self.element.size_expr(), self.length())
    }

    fn init_strategy(&self) -> InitStrategy {
        InitStrategy::Intrinsic
    }

    fn parse_member(&mut self, node: &Map<String, Value>) -> Result<(), SercError> {
        match node.get("list_length") {
            Some(value) => {
                let text = length_text(value).ok_or_else(|| {
                    SercError::parse(format!(
                        "list_length must be a non-empty string or a non-negative integer, found a {}",
                        node_kind(value)
                    ))
                })?;
                self.length = Some(text);
                Ok(())
            }
            None if self.length.is_some() => Ok(()),
            None => Err(SercError::parse("Malloc lists must have a list_length")),
        }
    }

    fn check_element(&self) -> Result<(), SercError> {
        if self.length.is_none() {
            return Err(SercError::type_args(
                self.type_id,
                "A list used as a list element needs a list_length argument",
            ));
        }
        Ok(())
    }

    fn constructor_lines(&self, field: &str, _init: &InitialValue) -> Vec<String> {
        vec![
            format!(
                "    this->{} = malloc(sizeof({}) * {});",
                field,
                self.element.c_type(),
                self.length()
            ),
            format!("    if (this->{} == NULL) {{", field),
            "        return -1;".to_string(),
            "    }".to_string(),
        ]
    }

    fn field_address(&self, field: &str) -> String {
        format!("this->{}", field)
    }

    fn referenced_structures(&self) -> Vec<&str> {
        self.element.referenced_structures()
    }
}

pub fn register(registry: &mut TypeRegistry) -> Result<(), SercError> {
    registry.register(VECTOR_ID, "ListType(vector)", ListType::new_vector)?;
    registry.register(MALLOC_LIST_ID, "ListType(malloc_list)", ListType::new_malloc_list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::REGISTRY;
    use serde_json::json;

    fn list(node: Value, member: Value) -> Box<dyn TypeDescriptor> {
        let mut ty = TypeResolver::new(&REGISTRY).resolve(&node).unwrap();
        ty.parse_member(member.as_object().unwrap()).unwrap();
        ty
    }

    #[test]
    fn test_vector_of_double() {
        let ty = list(
            json!({"type_name": "vector", "args": ["double"]}),
            json!({"name": "data", "list_length": "n"}),
        );
        assert_eq!(ty.c_type(), "double*");
        assert_eq!(ty.size_expr(), "(sizeof(double) * n)");
        assert_eq!(ty.init_strategy(), InitStrategy::Intrinsic);
        assert_eq!(
            ty.constructor_lines("data", &InitialValue::Intrinsic),
            vec![
                "    this->data = malloc(sizeof(double) * n);",
                "    if (this->data == NULL) {",
                "        return -1;",
                "    }",
            ]
        );
        assert_eq!(ty.field_address("data"), "this->data");
    }

    #[test]
    fn test_composite_contract_holds_for_nested_lists() {
        let inner = json!({"type_name": "malloc_list", "args": {"element_type": {"type_name": "int", "args": ["unsigned", 8]}, "list_length": 4}});
        let ty = list(
            json!({"type_name": "vector", "args": {"elementTypeNode": inner.clone()}}),
            json!({"name": "rows", "list_length": "row_count"}),
        );
        let element = TypeResolver::new(&REGISTRY).resolve(&inner).unwrap();
        assert_eq!(ty.c_type(), format!("{}*", element.c_type()));
        assert_eq!(ty.c_type(), "uint8_t**");
        assert_eq!(ty.size_expr(), format!("({} * row_count)", element.size_expr()));
        assert_eq!(ty.size_expr(), "((sizeof(uint8_t) * 4) * row_count)");
        let mut headers = ty.required_headers();
        headers.sort();
        headers.dedup();
        assert_eq!(headers, vec!["stdint.h", "stdlib.h"]);
    }

    #[test]
    fn test_default_element_is_int() {
        let ty = list(json!("malloc_list"), json!({"name": "values", "list_length": 3}));
        assert_eq!(ty.c_type(), "int*");
        assert_eq!(ty.size_expr(), "(sizeof(int) * 3)");
    }

    #[test]
    fn test_length_from_args_and_member_override() {
        let ty = list(
            json!({"type_name": "vector", "args": ["float", "8"]}),
            json!({"name": "samples"}),
        );
        assert_eq!(ty.size_expr(), "(sizeof(float) * 8)");

        let ty = list(
            json!({"type_name": "vector", "args": ["float", "8"]}),
            json!({"name": "samples", "list_length": "count"}),
        );
        assert_eq!(ty.size_expr(), "(sizeof(float) * count)");
    }

    #[test]
    fn test_missing_length_is_a_parse_error() {
        let mut ty = TypeResolver::new(&REGISTRY).resolve(&json!("vector")).unwrap();
        let err = ty.parse_member(json!({"name": "data"}).as_object().unwrap()).unwrap_err();
        assert!(matches!(err, SercError::Parse { .. }));

        let err = ty
            .parse_member(json!({"name": "data", "list_length": ["n"]}).as_object().unwrap())
            .unwrap_err();
        assert!(matches!(err, SercError::Parse { .. }));
    }

    #[test]
    fn test_nested_list_element_needs_length() {
        let node = json!({"type_name": "vector", "args": ["vector"]});
        let err = TypeResolver::new(&REGISTRY).resolve(&node).unwrap_err();
        assert!(matches!(err, SercError::TypeArgs { .. }));
    }
}
