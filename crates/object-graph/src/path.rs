//! Assignment through symbolic paths with dynamically typed values.

use std::path::PathBuf;

use doc_types::PathValue;

use crate::document::Document;
use crate::errors::{DocumentError, PropertyError};
use crate::object::ObjectId;
use crate::value::PropertyValue;

impl Document {
    /// Assign a dynamic value to the property named by `path`.
    ///
    /// Numbers convert between integer and float; constrained properties
    /// clamp. Read-only properties refuse the assignment.
    pub fn set_path_value(
        &mut self,
        id: ObjectId,
        path: &str,
        value: &PathValue,
    ) -> Result<(), DocumentError> {
        let name = property_name(path).map_err(|e| DocumentError::property(path, e))?;
        let prop = self.property(id, name)?;
        if prop.is_read_only() {
            return Err(DocumentError::property(
                name,
                PropertyError::ReadOnly {
                    name: name.to_string(),
                },
            ));
        }
        let new = convert(prop.value(), value).map_err(|e| DocumentError::property(name, e))?;
        self.apply_value(id, name, new, true)
    }

    /// Read the property named by `path` as a dynamic value.
    pub fn get_path_value(&self, id: ObjectId, path: &str) -> Result<PathValue, DocumentError> {
        let name = property_name(path).map_err(|e| DocumentError::property(path, e))?;
        let value = match self.value(id, name)? {
            PropertyValue::Integer(v) | PropertyValue::IntegerConstraint { value: v, .. } => {
                PathValue::Int(*v)
            }
            PropertyValue::Float(v) | PropertyValue::FloatConstraint { value: v, .. } => {
                PathValue::Float(*v)
            }
            PropertyValue::Bool(v) => PathValue::Bool(*v),
            PropertyValue::String(s) | PropertyValue::Font(s) => PathValue::Str(s.clone()),
            PropertyValue::Path(p) => PathValue::Str(p.to_string_lossy().into_owned()),
            PropertyValue::Enumeration(e) => PathValue::Int(e.index()),
            other => {
                return Err(DocumentError::property(
                    name,
                    PropertyError::NoPathValue {
                        kind: other.type_name(),
                    },
                ))
            }
        };
        Ok(value)
    }
}

/// Paths address a property directly; nested paths are not supported.
fn property_name(path: &str) -> Result<&str, PropertyError> {
    if path.is_empty() || path.contains('.') {
        return Err(PropertyError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(path)
}

fn convert(current: &PropertyValue, value: &PathValue) -> Result<PropertyValue, PropertyError> {
    let unsupported = || PropertyError::UnsupportedPathValue {
        kind: current.type_name(),
        value: value.to_string(),
    };
    let converted = match current {
        PropertyValue::Integer(_) | PropertyValue::IntegerConstraint { .. } => {
            let v = match value {
                PathValue::Int(v) => *v,
                PathValue::Float(f) => f.round() as i64,
                _ => value.unitless().ok_or_else(unsupported)?.round() as i64,
            };
            current.pasted(&PropertyValue::Integer(v))?
        }
        PropertyValue::Float(_) | PropertyValue::FloatConstraint { .. } => {
            let v = match value {
                PathValue::Float(f) => *f,
                PathValue::Int(v) => *v as f64,
                _ => value.unitless().ok_or_else(unsupported)?,
            };
            current.pasted(&PropertyValue::Float(v))?
        }
        PropertyValue::Bool(_) => PropertyValue::Bool(match value {
            PathValue::Bool(b) => *b,
            PathValue::Int(v) => *v != 0,
            PathValue::Float(f) => f.round() != 0.0,
            _ => value.unitless().ok_or_else(unsupported)? != 0.0,
        }),
        PropertyValue::Enumeration(e) => {
            let mut e = e.clone();
            match value {
                PathValue::Int(i) => e.set_index(*i)?,
                PathValue::Float(f) => e.set_index(f.trunc() as i64)?,
                PathValue::Str(s) => e.select(s)?,
                _ => return Err(unsupported()),
            }
            PropertyValue::Enumeration(e)
        }
        PropertyValue::String(_) => match value {
            PathValue::Str(s) => PropertyValue::String(s.clone()),
            _ => return Err(unsupported()),
        },
        PropertyValue::Font(_) => match value {
            PathValue::Str(s) => PropertyValue::Font(s.clone()),
            _ => return Err(unsupported()),
        },
        PropertyValue::Path(_) => match value {
            PathValue::Str(s) => PropertyValue::Path(PathBuf::from(s)),
            _ => return Err(unsupported()),
        },
        _ => return Err(unsupported()),
    };
    Ok(converted)
}
