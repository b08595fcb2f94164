use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::{
    error::SercError,
    gen_c::generate_c,
    registry::{TypeRegistry, REGISTRY},
    structure::Structure,
    types::TypeResolver,
    verifier::{link_structures, verify_structures},
};

/// Every structure of one schema, in declaration order.
#[derive(Debug, Serialize)]
pub struct CompiledSchema {
    pub structures: Vec<Structure>,
}

impl CompiledSchema {
    pub fn get(&self, type_name: &str) -> Option<&Structure> {
        self.structures.iter().find(|s| s.type_name == type_name)
    }

    /// Union of every structure's headers, sorted.
    pub fn required_headers(&self) -> BTreeSet<&'static str> {
        self.structures
            .iter()
            .flat_map(|s| s.required_headers())
            .collect()
    }
}

/// Compiles decoded schema trees against a type registry.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'r> {
    registry: &'r TypeRegistry,
}

impl Default for Compiler<'static> {
    fn default() -> Self {
        Compiler::new()
    }
}

impl Compiler<'static> {
    /// A compiler over the built-in types.
    pub fn new() -> Self {
        Compiler { registry: &*REGISTRY }
    }
}

impl<'r> Compiler<'r> {
    pub fn with_registry(registry: &'r TypeRegistry) -> Self {
        Compiler { registry }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Compiles a whole schema. Any failing structure fails the run.
    pub fn compile(&self, schema: &Value) -> Result<CompiledSchema, SercError> {
        let struct_list = match schema.get("struct_list") {
            Some(Value::Array(list)) => list,
            _ => return Err(SercError::parse("The schema must have a struct_list list")),
        };

        let resolver = TypeResolver::new(self.registry);
        let mut structures = struct_list
            .iter()
            .map(|node| Structure::compile(node, &resolver))
            .collect::<Result<Vec<_>, _>>()?;
        verify_structures(&structures)?;
        link_structures(&mut structures)?;

        info!(structures = structures.len(), "compiled schema");
        Ok(CompiledSchema { structures })
    }

    /// Compiles a schema and emits the C source for it.
    pub fn compile_to_c(&self, schema: &Value) -> Result<String, SercError> {
        Ok(generate_c(&self.compile(schema)?))
    }
}

/// Compiles a decoded schema with the built-in types.
pub fn compile_schema(schema: &Value) -> Result<CompiledSchema, SercError> {
    Compiler::new().compile(schema)
}

/// Compiles a decoded schema with the built-in types and emits C.
pub fn compile_schema_to_c(schema: &Value) -> Result<String, SercError> {
    Compiler::new().compile_to_c(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        args::TypeArgs,
        types::{int::IntType, TypeDescriptor},
    };
    use serde_json::json;

    #[test]
    fn test_struct_list_is_required() {
        for schema in [json!({}), json!({"struct_list": {}}), json!([]), json!({"structs": []})] {
            assert!(matches!(compile_schema(&schema), Err(SercError::Parse { .. })));
        }
        assert!(compile_schema(&json!({"struct_list": []})).unwrap().structures.is_empty());
    }

    #[test]
    fn test_one_bad_structure_fails_the_run() {
        let schema = json!({"struct_list": [
            {"type_name": "Good", "contents": [{"type": "int", "name": "x"}]},
            {"type_name": "Bad"}
        ]});
        let err = compile_schema(&schema).unwrap_err();
        assert_eq!(err.location().unwrap().structure.as_deref(), Some("Bad"));
    }

    #[test]
    fn test_extended_registry() {
        fn new_counter(
            args: &TypeArgs,
            resolver: &TypeResolver<'_>,
        ) -> Result<Box<dyn TypeDescriptor>, SercError> {
            IntType::new(&TypeArgs::Positional(vec![json!("unsigned"), json!(32)]), resolver)
                .and_then(|ty| match args {
                    TypeArgs::Absent => Ok(ty),
                    _ => Err(SercError::type_args("counter", "Takes no arguments")),
                })
        }

        let mut registry = TypeRegistry::builtin();
        registry.register("counter", "Counter", new_counter).unwrap();
        let compiler = Compiler::with_registry(&registry);

        let schema = json!({"struct_list": [
            {"type_name": "Stats", "contents": [{"type": "counter", "name": "hits"}]}
        ]});
        let compiled = compiler.compile(&schema).unwrap();
        assert_eq!(compiled.get("Stats").unwrap().members[0].c_type(), "uint32_t");
        assert!(compile_schema(&schema).is_err());
    }

    #[test]
    fn test_schema_headers() {
        let schema = json!({"struct_list": [
            {"type_name": "A", "contents": [{"type": {"type_name": "int", "args": [ "signed", 64]}, "name": "id"}]},
            {"type_name": "B", "contents": []}
        ]});
        let headers: Vec<&str> = compile_schema(&schema).unwrap().required_headers().into_iter().collect();
        assert_eq!(headers, vec!["stdint.h", "stdlib.h", "string.h", "sys/types.h"]);
    }
}
