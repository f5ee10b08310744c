use crate::object::ObjectId;

/// Notifications queued by a [`Document`](crate::Document) as it changes.
///
/// Drained with [`Document::take_events`](crate::Document::take_events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    ObjectCreated { object: ObjectId, name: String },
    ObjectDeleted { object: ObjectId, name: String },
    PropertyAboutToChange { object: ObjectId, property: String },
    PropertyChanged { object: ObjectId, property: String },
}

impl DocumentEvent {
    pub fn object(&self) -> ObjectId {
        match self {
            DocumentEvent::ObjectCreated { object, .. }
            | DocumentEvent::ObjectDeleted { object, .. }
            | DocumentEvent::PropertyAboutToChange { object, .. }
            | DocumentEvent::PropertyChanged { object, .. } => *object,
        }
    }
}
