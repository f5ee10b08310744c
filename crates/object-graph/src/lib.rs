//! The document object graph.
//!
//! A [`Document`] owns [`DocumentObject`]s; each object owns named
//! [`Property`] values. Link properties refer to other objects of the same
//! document by [`ObjectId`], and every target keeps the inverse edge in its
//! back-link set. All writes go through the document so that change events,
//! touch state, undo history and back-links stay consistent.
//!
//! Persisted elements per property kind:
//!
//! | Kind | Element |
//! |---|---|
//! | `Link` | `<Link value="name"/>` |
//! | `LinkList` | `<LinkList count="n">` + `<Link value=".."/>` |
//! | `LinkSub` | `<LinkSub value="name" count="n">` + `<Sub value=".."/>` |
//! | `LinkSubList` | `<LinkSubList count="n">` + `<Link obj=".." sub=".."/>` |
//! | scalars | `<Integer value=".."/>`, `<Float>`, `<Bool>`, `<String>` (also `Font`), `<Path>`, `<Uuid>`, `<PropertyColor>` |
//! | `Material` | `<PropertyMaterial ambientColor=".." ... transparency=".."/>` |
//! | `Enumeration` | `<Integer value="i" CustomEnum="true"/>` + `<CustomEnumList count="n">` |
//! | `IntegerList`/`IntegerSet` | `count` + `<I v=".."/>` |
//! | `StringList` | `count` + `<String value=".."/>` |
//! | `Map` | `count` + `<Item key=".." value=".."/>` |
//! | `BoolList` | `<BoolList value="0110"/>` |
//! | `FloatList`/`ColorList`/`MaterialList` | `file="..."`, or inline `F`/`C`/`M` children |

pub mod config;
pub mod document;
pub mod document_io;
pub mod errors;
pub mod events;
pub mod links;
pub mod object;
pub mod path;
pub mod persist;
pub mod property;
pub mod recompute;
pub mod undo;
pub mod value;

pub use config::{LoadOptions, SaveOptions, UndoConfig};
pub use document::Document;
pub use document_io::{
    ImportedObjects, LoadedDocument, ObjectFactory, PlainObjects, SavedDocument, SCHEMA_VERSION,
};
pub use errors::{DocumentError, PropertyError};
pub use events::DocumentEvent;
pub use links::{LinkSub, LinkSubList, SubSet};
pub use object::{DocumentObject, ObjectId};
pub use persist::PropertyRef;
pub use property::Property;
pub use recompute::RecomputeReport;
pub use undo::{Command, UndoStack};
pub use value::{PropertyKind, PropertyValue};

pub use doc_types;
pub use persistence::{DiagnosticKind, LoadDiagnostic, PersistenceError};
