use doc_types::PropertyStatus;

use crate::errors::PropertyError;
use crate::value::PropertyValue;

/// A named value slot owned by one [`DocumentObject`](crate::DocumentObject).
///
/// Values are only changed through the owning document, which brackets
/// every write with change notification and back-link upkeep.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    pub(crate) status: PropertyStatus,
    pub(crate) value: PropertyValue,
    pub(crate) touched: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, value: PropertyValue, status: PropertyStatus) -> Self {
        Self {
            name: name.into(),
            status,
            value,
            touched: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> PropertyStatus {
        self.status
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn type_name(&self) -> &'static str {
        self.value.type_name()
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn is_read_only(&self) -> bool {
        self.status.contains(PropertyStatus::READ_ONLY)
    }

    /// An independent property with an equal value and status.
    ///
    /// The copy is detached: it is not touched and belongs to no object.
    pub fn copy(&self) -> Property {
        Property::new(self.name.clone(), self.value.clone(), self.status)
    }

    /// The value this property would hold after pasting `other`.
    ///
    /// Nothing is modified; the document installs the result.
    pub fn pasted(&self, other: &Property) -> Result<PropertyValue, PropertyError> {
        self.value.pasted(&other.value)
    }

    /// Approximate heap bytes used by the value.
    pub fn mem_size(&self) -> usize {
        self.name.capacity() + self.value.mem_size()
    }
}
