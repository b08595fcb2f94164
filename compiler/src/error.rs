use std::fmt;

use thiserror::Error;

/// Where in the schema an error was raised. Both parts are filled in on the
/// way out of the structure compiler, so errors raised while resolving a
/// bare type node start out empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub structure: Option<String>,
    pub member:    Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(structure) = &self.structure {
            write!(f, " in structure '{}'", structure)?;
        }
        if let Some(member) = &self.member {
            let sep = if self.structure.is_some() { "," } else { " in" };
            write!(f, "{} member '{}'", sep, member)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SercError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Type ID \"{type_id}\" registered by {claimant} is already owned by {existing}")]
    RegistrationConflict {
        type_id:  String,
        existing: &'static str,
        claimant: &'static str,
    },

    #[error("Unknown member type \"{type_id}\"{location}")]
    UnknownType {
        type_id:  String,
        location: Location,
    },

    #[error("Bad arguments for type \"{type_id}\"{location}: {message}")]
    TypeArgs {
        type_id:  String,
        message:  String,
        location: Location,
    },

    #[error("Parse error{location}: {message}")]
    Parse {
        message:  String,
        location: Location,
    },

    #[error("Type nesting deeper than {limit} levels{location}")]
    TypeDepthExceeded {
        limit:    usize,
        location: Location,
    },
}

impl SercError {
    pub fn parse(message: impl Into<String>) -> Self {
        SercError::Parse {
            message:  message.into(),
            location: Location::default(),
        }
    }

    pub fn type_args(type_id: &str, message: impl Into<String>) -> Self {
        SercError::TypeArgs {
            type_id:  type_id.to_string(),
            message:  message.into(),
            location: Location::default(),
        }
    }

    pub fn unknown_type(type_id: &str) -> Self {
        SercError::UnknownType {
            type_id:  type_id.to_string(),
            location: Location::default(),
        }
    }

    /// Attaches the enclosing structure name unless one is already recorded.
    pub fn at_structure(mut self, structure: &str) -> Self {
        if let Some(location) = self.location_mut() {
            location.structure.get_or_insert_with(|| structure.to_string());
        }
        self
    }

    /// Attaches the member name unless one is already recorded.
    pub fn at_member(mut self, member: &str) -> Self {
        if let Some(location) = self.location_mut() {
            location.member.get_or_insert_with(|| member.to_string());
        }
        self
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            SercError::UnknownType { location, .. }
            | SercError::TypeArgs { location, .. }
            | SercError::Parse { location, .. }
            | SercError::TypeDepthExceeded { location, .. } => Some(location),
            _ => None,
        }
    }

    fn location_mut(&mut self) -> Option<&mut Location> {
        match self {
            SercError::UnknownType { location, .. }
            | SercError::TypeArgs { location, .. }
            | SercError::Parse { location, .. }
            | SercError::TypeDepthExceeded { location, .. } => Some(location),
            _ => None,
        }
    }
}
