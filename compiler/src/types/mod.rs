//! Member type descriptors.
//!
//! Every registered type ID maps to a constructor producing a boxed
//! [`TypeDescriptor`]. A descriptor knows how to spell its C type, which
//! headers it needs, how large it is and how a constructor initializes it.
//! Composite variants resolve their element type through the same
//! [`TypeResolver::resolve`] entry point, so nesting needs no special cases.

use std::fmt;

use serde_json::{Map, Value};

use crate::{
    args::TypeArgs,
    error::{Location, SercError},
    init_value::InitialValue,
    registry::TypeRegistry,
    utils::node_kind,
};

pub mod float;
pub mod int;
pub mod list;
pub mod stub;

/// Deepest type node nesting accepted before resolution gives up.
pub const MAX_TYPE_DEPTH: usize = 32;

pub type TypeConstructor =
    fn(&TypeArgs, &TypeResolver<'_>) -> Result<Box<dyn TypeDescriptor>, SercError>;

/// How a member of a given type gets its value in the generated constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStrategy {
    /// Assigned from an argument or a constant; `zero` is the literal used
    /// when a legacy `constructor_value` asks for a constant without a value.
    Assign { zero: &'static str },
    /// The type initializes itself (allocation, nested construction).
    Intrinsic,
}

pub trait TypeDescriptor: fmt::Debug + Send + Sync {
    fn type_id(&self) -> &'static str;

    fn c_type(&self) -> String;

    fn required_headers(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Size in bytes, as C source text.
    fn size_expr(&self) -> String;

    fn init_strategy(&self) -> InitStrategy;

    /// Reads variant specific fields from the member node.
    fn parse_member(&mut self, _node: &Map<String, Value>) -> Result<(), SercError> {
        Ok(())
    }

    /// Checks the descriptor is complete enough to be a list element.
    fn check_element(&self) -> Result<(), SercError> {
        Ok(())
    }

    fn constructor_lines(&self, field: &str, init: &InitialValue) -> Vec<String>;

    /// Destination pointer the serializer copies the member's bytes into.
    fn field_address(&self, field: &str) -> String {
        format!("&(this->{})", field)
    }

    /// Structure held by value, if any.
    fn contained_structure(&self) -> Option<&str> {
        None
    }

    /// Every structure this type mentions, by value or through a pointer.
    fn referenced_structures(&self) -> Vec<&str> {
        self.contained_structure().into_iter().collect()
    }
}

/// `this->field = <value>;` for value-initialized members.
pub fn assign_lines(field: &str, init: &InitialValue) -> Vec<String> {
    match init.render() {
        Some(value) => vec![format!("    this->{} = {};", field, value)],
        None => Vec::new(),
    }
}

/// Resolves type nodes against a registry, tracking nesting depth.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'r> {
    registry: &'r TypeRegistry,
    depth:    usize,
}

impl<'r> TypeResolver<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        TypeResolver { registry, depth: 0 }
    }

    /// Builds a descriptor from either a bare type ID string or a
    /// `{"type_name": .., "args": ..}` dictionary.
    pub fn resolve(&self, node: &Value) -> Result<Box<dyn TypeDescriptor>, SercError> {
        if self.depth >= MAX_TYPE_DEPTH {
            return Err(SercError::TypeDepthExceeded {
                limit:    MAX_TYPE_DEPTH,
                location: Location::default(),
            });
        }
        let nested = TypeResolver { registry: self.registry, depth: self.depth + 1 };

        match node {
            Value::String(type_id) => {
                let constructor = self.registry.resolve(type_id)?;
                constructor(&TypeArgs::Absent, &nested)
            }
            Value::Object(map) => {
                let type_id = match map.get("type_name") {
                    Some(Value::String(s)) => s,
                    Some(other) => {
                        return Err(SercError::parse(format!(
                            "Type names must be strings, found a {}",
                            node_kind(other)
                        )))
                    }
                    None => return Err(SercError::parse("Types must have a type_name")),
                };
                let constructor = self.registry.resolve(type_id)?;
                let args = TypeArgs::from_node(type_id, map.get("args"))?;
                constructor(&args, &nested)
            }
            other => Err(SercError::parse(format!(
                "Types must be strings or type dictionaries, found a {}",
                node_kind(other)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::REGISTRY;
    use serde_json::json;

    #[test]
    fn test_resolve_bare_and_dictionary_nodes() {
        let resolver = TypeResolver::new(&REGISTRY);
        let bare = resolver.resolve(&json!("int")).unwrap();
        assert_eq!(bare.c_type(), "int");

        let full = resolver
            .resolve(&json!({"type_name": "int", "args": {"signedness": "unsigned", "width": 8}}))
            .unwrap();
        assert_eq!(full.c_type(), "uint8_t");
    }

    #[test]
    fn test_resolve_failures() {
        let resolver = TypeResolver::new(&REGISTRY);
        assert!(matches!(
            resolver.resolve(&json!("bogus_type")),
            Err(SercError::UnknownType { .. })
        ));
        assert!(matches!(
            resolver.resolve(&json!({"args": []})),
            Err(SercError::Parse { .. })
        ));
        assert!(matches!(resolver.resolve(&json!(7)), Err(SercError::Parse { .. })));
        assert!(matches!(
            resolver.resolve(&json!({"type_name": "int", "args": "signed"})),
            Err(SercError::TypeArgs { .. })
        ));
    }

    #[test]
    fn test_depth_ceiling() {
        let mut node = json!("int");
        for _ in 0..MAX_TYPE_DEPTH + 1 {
            node = json!({"type_name": "vector", "args": [node, "2"]});
        }
        let err = TypeResolver::new(&REGISTRY).resolve(&node).unwrap_err();
        assert!(matches!(err, SercError::TypeDepthExceeded { limit: MAX_TYPE_DEPTH, .. }));
    }
}
