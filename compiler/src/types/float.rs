use serde_json::Value;

use crate::{
    args::{bind, Param, TypeArgs},
    error::SercError,
    init_value::InitialValue,
    registry::TypeRegistry,
    types::{assign_lines, InitStrategy, TypeDescriptor, TypeResolver},
};

pub const FLOAT_ID: &str = "float";
pub const DOUBLE_ID: &str = "double";

static FLOAT_PARAMS: [Param; 1] = [Param::optional("width")];
static DOUBLE_PARAMS: [Param; 0] = [];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    Float,
    Double,
}

/// C floating point numbers. `double` is registered separately as the
/// same descriptor with the width fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatType {
    pub type_id: &'static str,
    pub width:   FloatWidth,
}

impl FloatType {
    pub fn new_float(args: &TypeArgs, _resolver: &TypeResolver<'_>) -> Result<Box<dyn TypeDescriptor>, SercError> {
        let bound = bind(FLOAT_ID, &FLOAT_PARAMS, args)?;
        let width = match bound.get("width") {
            None => FloatWidth::Float,
            Some(Value::String(s)) if s == "float" => FloatWidth::Float,
            Some(Value::String(s)) if s == "double" => FloatWidth::Double,
            Some(other) => {
                return Err(SercError::type_args(
                    FLOAT_ID,
                    format!("Floating point numbers must be one of the widths float, double, not {}", other),
                ))
            }
        };
        Ok(Box::new(FloatType { type_id: FLOAT_ID, width }))
    }

    pub fn new_double(args: &TypeArgs, _resolver: &TypeResolver<'_>) -> Result<Box<dyn TypeDescriptor>, SercError> {
        bind(DOUBLE_ID, &DOUBLE_PARAMS, args)?;
        Ok(Box::new(FloatType { type_id: DOUBLE_ID, width: FloatWidth::Double }))
    }
}

impl TypeDescriptor for FloatType {
    fn type_id(&self) -> &'static str {
        self.type_id
    }

    fn c_type(&self) -> String {
        match self.width {
            FloatWidth::Float => "float".to_string(),
            FloatWidth::Double => "double".to_string(),
        }
    }

    fn size_expr(&self) -> String {
        format!("sizeof({})", self.c_type())
    }

    fn init_strategy(&self) -> InitStrategy {
        match self.width {
            FloatWidth::Float => InitStrategy::Assign { zero: "0.0f" },
            FloatWidth::Double => InitStrategy::Assign { zero: "0.0" },
        }
    }

    fn constructor_lines(&self, field: &str, init: &InitialValue) -> Vec<String> {
        assign_lines(field, init)
    }
}

pub fn register(registry: &mut TypeRegistry) -> Result<(), SercError> {
    registry.register(FLOAT_ID, "FloatType", FloatType::new_float)?;
    registry.register(DOUBLE_ID, "FloatType(double)", FloatType::new_double)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::REGISTRY;
    use serde_json::json;

    #[test]
    fn test_widths() {
        let resolver = TypeResolver::new(&REGISTRY);
        let float = FloatType::new_float(&TypeArgs::Absent, &resolver).unwrap();
        assert_eq!(float.c_type(), "float");
        assert_eq!(float.size_expr(), "sizeof(float)");
        assert_eq!(float.init_strategy(), InitStrategy::Assign { zero: "0.0f" });

        let wide = FloatType::new_float(&TypeArgs::Positional(vec![json!("double")]), &resolver).unwrap();
        assert_eq!(wide.c_type(), "double");
        assert_eq!(wide.type_id(), FLOAT_ID);

        let double = FloatType::new_double(&TypeArgs::Absent, &resolver).unwrap();
        assert_eq!(double.c_type(), "double");
        assert_eq!(double.type_id(), DOUBLE_ID);
    }

    #[test]
    fn test_rejects_bad_widths() {
        let resolver = TypeResolver::new(&REGISTRY);
        let args = TypeArgs::Named(json!({"width": "half"}).as_object().unwrap().clone());
        assert!(matches!(FloatType::new_float(&args, &resolver), Err(SercError::TypeArgs { .. })));

        let args = TypeArgs::Positional(vec![json!("float")]);
        assert!(matches!(FloatType::new_double(&args, &resolver), Err(SercError::TypeArgs { .. })));
    }
}
