use doc_types::TypesError;
use persistence::PersistenceError;

use crate::object::ObjectId;

/// Errors raised by a single property operation.
///
/// None of these leave the property partially modified.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("incompatible property to paste to: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("size of subelements list ({subnames}) != size of objects list ({objects})")]
    LengthMismatch { objects: usize, subnames: usize },

    #[error("cannot assign {value} to a {kind} property")]
    UnsupportedPathValue { kind: &'static str, value: String },

    #[error("a {kind} property has no path value")]
    NoPathValue { kind: &'static str },

    #[error("invalid property path '{path}'")]
    InvalidPath { path: String },

    #[error("property '{name}' is read-only")]
    ReadOnly { name: String },

    #[error("value out of range: {0}")]
    OutOfRange(#[from] TypesError),
}

/// Errors from document-level operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentError {
    #[error("object not found: {id:?}")]
    ObjectNotFound { id: ObjectId },

    #[error("no object named '{name}'")]
    UnknownObjectName { name: String },

    #[error("object '{object}' has no property '{property}'")]
    PropertyNotFound { object: String, property: String },

    #[error("object '{object}' already has a property '{property}'")]
    DuplicateProperty { object: String, property: String },

    #[error("dependency cycle between objects: {}", objects.join(", "))]
    DependencyCycle { objects: Vec<String> },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("property error on '{property}': {source}")]
    Property {
        property: String,
        #[source]
        source: PropertyError,
    },

    #[error("cannot save {object}.{property}: {source}")]
    Save {
        object: String,
        property: String,
        #[source]
        source: PersistenceError,
    },

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl DocumentError {
    /// Attach the property name to a property-level error.
    pub fn property(property: &str, source: PropertyError) -> Self {
        DocumentError::Property {
            property: property.to_string(),
            source,
        }
    }
}
