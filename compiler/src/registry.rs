//! The table of member type IDs.
//!
//! Each built-in type module exposes a `register` function; [`TypeRegistry::builtin`]
//! calls them once and the result backs the process-wide [`REGISTRY`].

use std::collections::HashMap;

use lazy_static::lazy_static;
use tracing::debug;

use crate::{
    error::SercError,
    types::{float, int, list, stub, TypeConstructor},
};

lazy_static! {
    /// Built-in types, registered on first use and read-only afterwards.
    pub static ref REGISTRY: TypeRegistry = TypeRegistry::builtin();
}

#[derive(Clone, Copy)]
struct Registration {
    owner:       &'static str,
    constructor: TypeConstructor,
}

#[derive(Default)]
pub struct TypeRegistry {
    types: HashMap<String, Registration>,
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry").field("types", &self.type_ids()).finish()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in type.
    ///
    /// # Panics
    /// If two built-ins claim the same type ID. That is a defect in this
    /// crate, not in any schema, so there is nothing to recover.
    pub fn builtin() -> Self {
        let mut registry = TypeRegistry::new();
        let plugins: [fn(&mut TypeRegistry) -> Result<(), SercError>; 4] =
            [int::register, float::register, list::register, stub::register];
        for plugin in plugins {
            if let Err(err) = plugin(&mut registry) {
                panic!("{}", err);
            }
        }
        registry
    }

    /// Binds `type_id` (lower-cased) to `constructor`. `owner` names the
    /// descriptor in conflict reports.
    pub fn register(
        &mut self,
        type_id: &str,
        owner: &'static str,
        constructor: TypeConstructor,
    ) -> Result<(), SercError> {
        let key = type_id.to_lowercase();
        if let Some(existing) = self.types.get(&key) {
            return Err(SercError::RegistrationConflict {
                type_id:  key,
                existing: existing.owner,
                claimant: owner,
            });
        }
        debug!(type_id = %key, owner, "registered member type");
        self.types.insert(key, Registration { owner, constructor });
        Ok(())
    }

    pub fn resolve(&self, type_id: &str) -> Result<TypeConstructor, SercError> {
        self.types
            .get(&type_id.to_lowercase())
            .map(|r| r.constructor)
            .ok_or_else(|| SercError::unknown_type(type_id))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(&type_id.to_lowercase())
    }

    /// Registered IDs in sorted order.
    pub fn type_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.types.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
