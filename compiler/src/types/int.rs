use serde_json::Value;

use crate::{
    args::{bind, Param, TypeArgs},
    error::SercError,
    init_value::InitialValue,
    registry::TypeRegistry,
    types::{assign_lines, InitStrategy, TypeDescriptor, TypeResolver},
};

pub const TYPE_ID: &str = "int";

static PARAMS: [Param; 2] = [Param::optional("signedness"), Param::optional("width")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    System,
    Short,
    Long,
    Bits(u8),
}

impl IntWidth {
    pub const VALID: &'static str = "system, short, long, 8, 16, 32, 64";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => match s.as_str() {
                "system" => Some(IntWidth::System),
                "short" => Some(IntWidth::Short),
                "long" => Some(IntWidth::Long),
                _ => None,
            },
            Value::Number(n) => match n.as_u64()? {
                bits @ (8 | 16 | 32 | 64) => Some(IntWidth::Bits(bits as u8)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// C integers: `int`, `unsigned long`, `uint8_t` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntType {
    pub signed: bool,
    pub width:  IntWidth,
}

impl IntType {
    pub fn new(args: &TypeArgs, _resolver: &TypeResolver<'_>) -> Result<Box<dyn TypeDescriptor>, SercError> {
        let bound = bind(TYPE_ID, &PARAMS, args)?;

        let signed = match bound.get("signedness") {
            None => true,
            Some(Value::String(s)) if s == "signed" => true,
            Some(Value::String(s)) if s == "unsigned" => false,
            Some(other) => {
                return Err(SercError::type_args(
                    TYPE_ID,
                    format!("Integers must be either signed or unsigned, not {}", other),
                ))
            }
        };

        let width = match bound.get("width") {
            None => IntWidth::System,
            Some(value) => IntWidth::from_value(value).ok_or_else(|| {
                SercError::type_args(
                    TYPE_ID,
                    format!("Integers must be one of the widths {}, not {}", IntWidth::VALID, value),
                )
            })?,
        };

        Ok(Box::new(IntType { signed, width }))
    }
}

impl TypeDescriptor for IntType {
    fn type_id(&self) -> &'static str {
        TYPE_ID
    }

    fn c_type(&self) -> String {
        let unsigned = if self.signed { "" } else { "unsigned " };
        match self.width {
            IntWidth::System => format!("{}int", unsigned),
            IntWidth::Short => format!("{}short", unsigned),
            IntWidth::Long => format!("{}long", unsigned),
            IntWidth::Bits(bits) => {
                let prefix = if self.signed { "" } else { "u" };
                format!("{}int{}_t", prefix, bits)
            }
        }
    }

    fn required_headers(&self) -> Vec<&'static str> {
        match self.width {
            IntWidth::Bits(_) => vec!["stdint.h"],
            _ => Vec::new(),
        }
    }

    fn size_expr(&self) -> String {
        format!("sizeof({})", self.c_type())
    }

    fn init_strategy(&self) -> InitStrategy {
        InitStrategy::Assign { zero: "0" }
    }

    fn constructor_lines(&self, field: &str, init: &InitialValue) -> Vec<String> {
        assign_lines(field, init)
    }
}

pub fn register(registry: &mut TypeRegistry) -> Result<(), SercError> {
    registry.register(TYPE_ID, "IntType", IntType::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::REGISTRY;
    use serde_json::json;

    fn spell(args: Value) -> String {
        let args = TypeArgs::from_node(TYPE_ID, Some(&args)).unwrap();
        IntType::new(&args, &TypeResolver::new(&REGISTRY)).unwrap().c_type()
    }

    #[test]
    fn test_c_spelling_table() {
        let cases = [
            (json!(["signed", "system"]), "int"),
            (json!(["unsigned", "system"]), "unsigned int"),
            (json!(["signed", "short"]), "short"),
            (json!(["unsigned", "short"]), "unsigned short"),
            (json!(["signed", "long"]), "long"),
            (json!(["unsigned", "long"]), "unsigned long"),
            (json!(["signed", 8]), "int8_t"),
            (json!(["unsigned", 8]), "uint8_t"),
            (json!(["signed", 16]), "int16_t"),
            (json!(["unsigned", 32]), "uint32_t"),
            (json!({"width": 64}), "int64_t"),
            (json!({"signedness": "unsigned", "width": 64}), "uint64_t"),
        ];
        for (args, expected) in cases {
            assert_eq!(spell(args.clone()), expected, "args {}", args);
        }
    }

    #[test]
    fn test_defaults_and_headers() {
        let ty = IntType::new(&TypeArgs::Absent, &TypeResolver::new(&REGISTRY)).unwrap();
        assert_eq!(ty.c_type(), "int");
        assert_eq!(ty.size_expr(), "sizeof(int)");
        assert!(ty.required_headers().is_empty());

        let args = TypeArgs::Positional(vec![json!("unsigned"), json!(16)]);
        let ty = IntType::new(&args, &TypeResolver::new(&REGISTRY)).unwrap();
        assert_eq!(ty.required_headers(), vec!["stdint.h"]);
    }

    #[test]
    fn test_rejects_out_of_domain_arguments() {
        let resolver = TypeResolver::new(&REGISTRY);
        for args in [json!(["maybe"]), json!(["signed", 12]), json!(["signed", "8"]), json!({"width": "huge"})] {
            let args = TypeArgs::from_node(TYPE_ID, Some(&args)).unwrap();
            assert!(matches!(
                IntType::new(&args, &resolver),
                Err(SercError::TypeArgs { .. })
            ));
        }
    }
}
