use std::fmt;

use serde::{Deserialize, Serialize};

/// A dynamically typed value assigned to a property through a symbolic path,
/// e.g. from an expression engine or a scripting binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PathValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// A number with a unit. Only unitless quantities convert to plain numbers.
    Quantity { value: f64, unit: String },
}

impl PathValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PathValue::Int(_) => "int",
            PathValue::Float(_) => "float",
            PathValue::Bool(_) => "bool",
            PathValue::Str(_) => "string",
            PathValue::Quantity { .. } => "quantity",
        }
    }

    /// The numeric value of a quantity without a unit.
    pub fn unitless(&self) -> Option<f64> {
        match self {
            PathValue::Quantity { value, unit } if unit.is_empty() => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValue::Int(v) => write!(f, "{}", v),
            PathValue::Float(v) => write!(f, "{}", v),
            PathValue::Bool(v) => write!(f, "{}", v),
            PathValue::Str(v) => write!(f, "'{}'", v),
            PathValue::Quantity { value, unit } => write!(f, "{} {}", value, unit),
        }
    }
}
