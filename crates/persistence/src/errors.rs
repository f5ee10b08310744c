/// Structural errors while reading or writing persistent data.
///
/// Any of these aborts the load of the enclosing document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersistenceError {
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    #[error("expected element <{expected}> not found")]
    MissingElement { expected: String },

    #[error("expected end of element <{expected}> not found")]
    MissingEndElement { expected: String },

    #[error("element <{element}> has no attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("attribute '{attribute}' has invalid value '{value}' (expected {expected})")]
    InvalidAttribute {
        attribute: String,
        value: String,
        expected: &'static str,
    },

    #[error("text {text:?} contains {character:?}, which XML cannot carry")]
    UnencodableText { text: String, character: char },

    #[error("no element has been read yet")]
    NoCurrentElement,

    #[error("unexpected end of binary data: wanted {wanted} bytes, {available} available")]
    UnexpectedEof { wanted: usize, available: usize },
}
