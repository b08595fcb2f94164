use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::SercError,
    types::{InitStrategy, TypeDescriptor},
    utils::{node_kind, quote},
};

const INIT_VALUE: &str = "init_value";
const LEGACY_INIT_VALUE: &str = "constructor_value";

/// One `(type, name)` parameter of a generated C function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Argument {
    pub c_type: String,
    pub name:   String,
}

impl Argument {
    pub fn new(c_type: impl Into<String>, name: impl Into<String>) -> Self {
        Argument { c_type: c_type.into(), name: name.into() }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.c_type, self.name)
    }
}

/// Where a member's value comes from when the structure is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InitialValue {
    /// Passed in by the caller of the constructor.
    Argument { arg_type: String, arg_name: String },
    /// A fixed C expression baked into the constructor.
    Constant { value: String },
    /// The member's type initializes itself and takes no value.
    Intrinsic,
    /// An embedded structure whose constructor arguments are passed through
    /// the container's constructor, renamed `<member>_<argument>`.
    Forwarded { arguments: Vec<Argument> },
}

impl InitialValue {
    /// Resolves the policy for one member from its optional `init_value`
    /// (or older `constructor_value`) node.
    pub fn resolve(
        node: &Map<String, Value>,
        ty: &dyn TypeDescriptor,
        name: &str,
    ) -> Result<Self, SercError> {
        let (key, init_node) = match (node.get(INIT_VALUE), node.get(LEGACY_INIT_VALUE)) {
            (Some(_), Some(_)) => {
                return Err(SercError::parse(format!(
                    "Give either {} or {}, not both",
                    INIT_VALUE, LEGACY_INIT_VALUE
                )))
            }
            (Some(init), None) => (INIT_VALUE, init),
            (None, Some(init)) => (LEGACY_INIT_VALUE, init),
            (None, None) => {
                return Ok(match ty.init_strategy() {
                    InitStrategy::Assign { .. } => InitialValue::Argument {
                        arg_type: ty.c_type(),
                        arg_name: name.to_string(),
                    },
                    InitStrategy::Intrinsic => InitialValue::Intrinsic,
                })
            }
        };

        let init = match init_node {
            Value::Object(map) => map,
            other => {
                return Err(SercError::parse(format!(
                    "Initial values must be dictionaries, found a {}",
                    node_kind(other)
                )))
            }
        };
        let kind = match init.get("type") {
            Some(Value::String(kind)) => kind.to_lowercase(),
            _ => return Err(SercError::parse("Initial values must have a string type field")),
        };

        // None for an argument, Some(value) for a constant
        let constant = match kind.as_str() {
            "argument" => None,
            "constant" => match init.get("value") {
                Some(Value::String(value)) => Some(Some(value.as_str())),
                None if key == LEGACY_INIT_VALUE => Some(None),
                _ => return Err(SercError::parse("Constant initial values must have a string value field")),
            },
            other => {
                return Err(SercError::parse(format!(
                    "Unknown initial value type {}, expected \"argument\" or \"constant\"",
                    quote(other)
                )))
            }
        };

        let zero = match ty.init_strategy() {
            InitStrategy::Assign { zero } => zero,
            InitStrategy::Intrinsic => {
                debug!(type_id = ty.type_id(), member = name, "ignoring {} on a self-initializing member", key);
                return Ok(InitialValue::Intrinsic);
            }
        };

        Ok(match constant {
            None => InitialValue::Argument {
                arg_type: ty.c_type(),
                arg_name: name.to_string(),
            },
            Some(value) => InitialValue::Constant {
                value: value.unwrap_or(zero).to_string(),
            },
        })
    }

    /// The constructor parameters this policy asks for, in order.
    pub fn arguments(&self) -> Vec<Argument> {
        match self {
            InitialValue::Argument { arg_type, arg_name } => vec![Argument::new(arg_type, arg_name)],
            InitialValue::Forwarded { arguments } => arguments.clone(),
            _ => Vec::new(),
        }
    }

    /// The C expression assigned to the member, if the policy has one.
    pub fn render(&self) -> Option<&str> {
        match self {
            InitialValue::Argument { arg_name, .. } => Some(arg_name),
            InitialValue::Constant { value } => Some(value),
            InitialValue::Intrinsic | InitialValue::Forwarded { .. } => None,
        }
    }
}
