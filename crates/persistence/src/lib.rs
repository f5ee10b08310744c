//! The structured save/restore protocol shared by every persistent type.
//!
//! - [`Writer`] produces indented XML and registers auxiliary binary files.
//! - [`XmlReader`] walks a parsed document element by element and collects
//!   recoverable [`LoadDiagnostic`]s.
//! - [`BinaryWriter`] / [`BinaryReader`] encode the little-endian payloads
//!   of auxiliary files.

pub mod binary;
pub mod errors;
pub mod escape;
pub mod reader;
pub mod writer;

pub use binary::{BinaryReader, BinaryWriter};
pub use errors::PersistenceError;
pub use escape::{check_text, encode_attribute, is_xml_char};
pub use reader::{DiagnosticKind, LoadDiagnostic, XmlReader};
pub use writer::{FileEntry, Writer};
