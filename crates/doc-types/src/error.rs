/// Errors raised when constructing or updating value types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypesError {
    #[error("invalid range: lower bound {lower} exceeds upper bound {upper}")]
    InvalidRange { lower: String, upper: String },

    #[error("enumeration index {index} out of range (enumeration has {count} items)")]
    EnumIndexOutOfRange { index: i64, count: usize },

    #[error("'{item}' is not an item of the enumeration")]
    UnknownEnumItem { item: String },
}
