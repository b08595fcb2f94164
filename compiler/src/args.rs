//! Construction arguments for type descriptors.
//!
//! A type node's `args` is decoded once into [`TypeArgs`] and then bound
//! against the parameter list a variant declares, so every variant sees the
//! same checks for positional overflow, unknown keys and missing values.

use serde_json::{Map, Value};

use crate::{error::SercError, utils::{node_kind, quote}};

#[derive(Debug, Clone, PartialEq)]
pub enum TypeArgs {
    Absent,
    Positional(Vec<Value>),
    Named(Map<String, Value>),
}

impl TypeArgs {
    /// Decodes the optional `args` field of a type dictionary.
    pub fn from_node(type_id: &str, node: Option<&Value>) -> Result<Self, SercError> {
        match node {
            None => Ok(TypeArgs::Absent),
            Some(Value::Array(items)) => Ok(TypeArgs::Positional(items.clone())),
            Some(Value::Object(map)) => Ok(TypeArgs::Named(map.clone())),
            Some(other) => Err(SercError::type_args(
                type_id,
                format!("Args must be a list or a dictionary, found a {}", node_kind(other)),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name:     &'static str,
    pub alias:    Option<&'static str>,
    pub required: bool,
}

impl Param {
    pub const fn required(name: &'static str) -> Self {
        Param { name, alias: None, required: true }
    }

    pub const fn optional(name: &'static str) -> Self {
        Param { name, alias: None, required: false }
    }

    pub const fn alias(self, alias: &'static str) -> Self {
        Param { alias: Some(alias), ..self }
    }

    fn matches(&self, key: &str) -> bool {
        self.name == key || self.alias == Some(key)
    }
}

/// Arguments matched to a variant's parameter list.
#[derive(Debug)]
pub struct BoundArgs<'a> {
    params: &'static [Param],
    values: Vec<Option<&'a Value>>,
}

impl<'a> BoundArgs<'a> {
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.params
            .iter()
            .position(|p| p.name == name)
            .and_then(|i| self.values[i])
    }
}

pub fn bind<'a>(
    type_id: &str,
    params: &'static [Param],
    args: &'a TypeArgs,
) -> Result<BoundArgs<'a>, SercError> {
    let mut values: Vec<Option<&'a Value>> = vec![None; params.len()];

    match args {
        TypeArgs::Absent => {}
        TypeArgs::Positional(items) => {
            if items.len() > params.len() {
                return Err(SercError::type_args(
                    type_id,
                    format!(
                        "Takes at most {} argument(s) but {} were given",
                        params.len(),
                        items.len()
                    ),
                ));
            }
            for (slot, item) in values.iter_mut().zip(items) {
                *slot = Some(item);
            }
        }
        TypeArgs::Named(map) => {
            for (key, value) in map {
                let index = params.iter().position(|p| p.matches(key)).ok_or_else(|| {
                    SercError::type_args(type_id, format!("Unknown argument {}", quote(key)))
                })?;
                if values[index].is_some() {
                    return Err(SercError::type_args(
                        type_id,
                        format!("Argument {} given more than once", quote(params[index].name)),
                    ));
                }
                values[index] = Some(value);
            }
        }
    }

    for (param, value) in params.iter().zip(&values) {
        if param.required && value.is_none() {
            return Err(SercError::type_args(
                type_id,
                format!("Missing required argument {}", quote(param.name)),
            ));
        }
    }

    Ok(BoundArgs { params, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static PARAMS: [Param; 2] = [
        Param::required("element_type").alias("elementTypeNode"),
        Param::optional("list_length"),
    ];

    #[test]
    fn test_positional_binding() {
        let args = TypeArgs::from_node("vector", Some(&json!(["double", "n"]))).unwrap();
        let bound = bind("vector", &PARAMS, &args).unwrap();
        assert_eq!(bound.get("element_type"), Some(&json!("double")));
        assert_eq!(bound.get("list_length"), Some(&json!("n")));
    }

    #[test]
    fn test_named_binding_through_alias() {
        let args = TypeArgs::from_node("vector", Some(&json!({"elementTypeNode": "int"}))).unwrap();
        let bound = bind("vector", &PARAMS, &args).unwrap();
        assert_eq!(bound.get("element_type"), Some(&json!("int")));
        assert_eq!(bound.get("list_length"), None);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let err = TypeArgs::from_node("int", Some(&json!("signed"))).unwrap_err();
        assert!(matches!(err, SercError::TypeArgs { .. }));

        let args = TypeArgs::Positional(vec![json!(1), json!(2), json!(3)]);
        assert!(bind("vector", &PARAMS, &args).is_err());

        let args = TypeArgs::from_node("vector", Some(&json!({"length": 3}))).unwrap();
        let err = bind("vector", &PARAMS, &args).unwrap_err();
        assert!(err.to_string().contains("Unknown argument \"length\""));

        let args = TypeArgs::from_node(
            "vector",
            Some(&json!({"element_type": "int", "elementTypeNode": "int"})),
        )
        .unwrap();
        assert!(bind("vector", &PARAMS, &args).is_err());

        let err = bind("vector", &PARAMS, &TypeArgs::Absent).unwrap_err();
        assert!(err.to_string().contains("Missing required argument \"element_type\""));
    }
}
