//! Project archives: a JSON manifest, the document XML and the auxiliary
//! binary files written next to it.

pub mod archive;
pub mod errors;
pub mod load;
pub mod metadata;
pub mod migrate;
pub mod save;

pub use archive::{ProjectArchive, DOCUMENT_FILE, MANIFEST_FILE};
pub use errors::{LoadError, SaveError};
pub use load::{load_project, parse_manifest, LoadedProject};
pub use metadata::ProjectMetadata;
pub use save::{save_project, Manifest, FORMAT_ID, FORMAT_VERSION};
