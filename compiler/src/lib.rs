//! serc-compiler
//!
//! This crate implements:
//!  1) A registry of member types (`int`, `float`, `double`, `vector`,
//!     `malloc_list`, `struct`), open to embedders through `TypeRegistry`,
//!  2) Resolution of type nodes into type descriptors, including nested
//!     composite types,
//!  3) Initial-value policies for generated constructors,
//!  4) A structure compiler and a cross-structure verifier,
//!  5) C code generation (`generate_c` → `String`),
//!  6) The error type (`SercError`).

pub mod error;
pub mod utils;
pub mod args;
pub mod registry;
pub mod types;
pub mod init_value;
pub mod structure;
pub mod verifier;
pub mod compiler;
pub mod gen_c;

pub use compiler::{compile_schema, compile_schema_to_c, CompiledSchema, Compiler};
pub use error::{Location, SercError};
pub use gen_c::generate_c;
pub use init_value::{Argument, InitialValue};
pub use registry::{TypeRegistry, REGISTRY};
pub use structure::{Member, Structure};
pub use types::{TypeDescriptor, TypeResolver};
