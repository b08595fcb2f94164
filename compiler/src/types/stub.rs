use serde_json::Value;

use crate::{
    args::{bind, Param, TypeArgs},
    error::SercError,
    init_value::InitialValue,
    registry::TypeRegistry,
    types::{InitStrategy, TypeDescriptor, TypeResolver},
    utils::{is_identifier, quote},
};

pub const TYPE_ID: &str = "struct";

static PARAMS: [Param; 1] = [Param::required("struct_type_name").alias("structTypeName")];

/// A structure embedded by value in another structure. Only the name is
/// recorded; the referenced structure's members are never expanded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructStub {
    pub struct_type_name: String,
}

impl StructStub {
    pub fn new(args: &TypeArgs, _resolver: &TypeResolver<'_>) -> Result<Box<dyn TypeDescriptor>, SercError> {
        let bound = bind(TYPE_ID, &PARAMS, args)?;
        let name = match bound.get("struct_type_name") {
            Some(Value::String(s)) if is_identifier(s) => s.clone(),
            other => {
                let shown = match other {
                    Some(Value::String(s)) => s.clone(),
                    Some(v) => v.to_string(),
                    None => String::new(),
                };
                return Err(SercError::type_args(
                    TYPE_ID,
                    format!("struct_type_name must be a C identifier, not {}", quote(&shown)),
                ));
            }
        };
        Ok(Box::new(StructStub { struct_type_name: name }))
    }
}

impl TypeDescriptor for StructStub {
    fn type_id(&self) -> &'static str {
        TYPE_ID
    }

    fn c_type(&self) -> String {
        format!("struct {}", self.struct_type_name)
    }

    fn size_expr(&self) -> String {
        format!("sizeof({})", self.c_type())
    }

    fn init_strategy(&self) -> InitStrategy {
        InitStrategy::Intrinsic
    }

    fn constructor_lines(&self, field: &str, init: &InitialValue) -> Vec<String> {
        let mut call_args = vec![format!("&(this->{})", field)];
        call_args.extend(init.arguments().into_iter().map(|arg| arg.name));
        vec![
            format!("    if ({}_construct({}) < 0) {{", self.struct_type_name, call_args.join(", ")),
            "        return -1;".to_string(),
            "    }".to_string(),
        ]
    }

    fn contained_structure(&self) -> Option<&str> {
        Some(self.struct_type_name.as_str())
    }
}

pub fn register(registry: &mut TypeRegistry) -> Result<(), SercError> {
    registry.register(TYPE_ID, "StructStub", StructStub::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{init_value::Argument, registry::REGISTRY};
    use serde_json::json;

    #[test]
    fn test_stub_contract() {
        let ty = TypeResolver::new(&REGISTRY)
            .resolve(&json!({"type_name": "struct", "args": ["Header"]}))
            .unwrap();
        assert_eq!(ty.c_type(), "struct Header");
        assert_eq!(ty.size_expr(), "sizeof(struct Header)");
        assert_eq!(ty.contained_structure(), Some("Header"));
        assert_eq!(ty.referenced_structures(), vec!["Header"]);
        assert_eq!(
            ty.constructor_lines("header", &InitialValue::Intrinsic),
            vec![
                "    if (Header_construct(&(this->header)) < 0) {",
                "        return -1;",
                "    }",
            ]
        );
    }

    #[test]
    fn test_stub_forwards_arguments() {
        let ty = TypeResolver::new(&REGISTRY).resolve(&json!({"type_name": "struct", "args": ["Point"]})).unwrap();
        let init = InitialValue::Forwarded {
            arguments: vec![Argument::new("int", "a_x"), Argument::new("int", "a_y")],
        };
        assert_eq!(
            ty.constructor_lines("a", &init)[0],
            "    if (Point_construct(&(this->a), a_x, a_y) < 0) {"
        );
    }

    #[test]
    fn test_stub_needs_a_name() {
        let resolver = TypeResolver::new(&REGISTRY);
        for node in [
            json!("struct"),
            json!({"type_name": "struct", "args": [42]}),
            json!({"type_name": "struct", "args": {"structTypeName": "not valid"}}),
        ] {
            assert!(matches!(resolver.resolve(&node), Err(SercError::TypeArgs { .. })));
        }
    }
}
