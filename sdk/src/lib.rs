//! serc
//!
//! Entry points for turning SerC schema documents into C source.
//!
//! - Reading schemas from text or any `std::io::Read`
//! - Writing generated C to any `std::io::Write`
//! - Dumping the compiled model as JSON
//! - Re-exports of the compiler (`Compiler`, `TypeRegistry`, `SercError`, ...)

use std::io::{Read, Write};

use serde_json::Value;
use tracing::debug;

pub use serc_compiler::{
    compile_schema, compile_schema_to_c, generate_c, Argument, CompiledSchema, Compiler,
    InitialValue, Location, Member, SercError, Structure, TypeDescriptor, TypeRegistry,
    TypeResolver, REGISTRY,
};

/// Decodes schema text into the generic JSON tree the compiler consumes.
pub fn decode_schema(text: &str) -> Result<Value, SercError> {
    Ok(serde_json::from_str(text)?)
}

/// Decodes a schema from a reader.
pub fn read_schema<R: Read>(reader: R) -> Result<Value, SercError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Compiles schema text into C source.
pub fn compile_str(text: &str) -> Result<String, SercError> {
    compile_schema_to_c(&decode_schema(text)?)
}

/// Compiles a schema read from `reader` and writes the C source to `writer`.
/// Nothing is written unless the whole schema compiles.
pub fn compile_to_writer<R: Read, W: Write>(reader: R, mut writer: W) -> Result<(), SercError> {
    let c_code = compile_schema_to_c(&read_schema(reader)?)?;
    writer.write_all(c_code.as_bytes())?;
    writer.flush()?;
    debug!(bytes = c_code.len(), "wrote generated C");
    Ok(())
}

/// Pretty-printed JSON of the compiled model.
pub fn compiled_to_json(schema: &CompiledSchema) -> Result<String, SercError> {
    Ok(serde_json::to_string_pretty(schema)?)
}

pub mod error {
    pub use serc_compiler::error::{Location, SercError};
}

pub mod types {
    pub use serc_compiler::args::{Param, TypeArgs};
    pub use serc_compiler::types::*;
}
