use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::errors::{LoadError, SaveError};
use crate::load::parse_manifest;
use crate::save::Manifest;

/// Name of the manifest inside an archive directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Name of the document XML inside an archive directory.
pub const DOCUMENT_FILE: &str = "Document.xml";

/// Everything a saved project consists of.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectArchive {
    pub manifest: Manifest,
    pub document_xml: String,
    /// Auxiliary binary files by name.
    pub files: BTreeMap<String, Vec<u8>>,
}

impl ProjectArchive {
    /// Write the archive as a flat directory, creating it if needed.
    ///
    /// Auxiliary files may not shadow the manifest or the document.
    pub fn write_dir(&self, dir: &Path) -> Result<(), SaveError> {
        if let Some(name) = self.files.keys().find(|name| is_reserved(name)) {
            return Err(SaveError::ReservedFileName(name.clone()));
        }
        fs::create_dir_all(dir)?;
        fs::write(dir.join(MANIFEST_FILE), self.manifest.to_json()?)?;
        fs::write(dir.join(DOCUMENT_FILE), &self.document_xml)?;
        for (name, data) in &self.files {
            fs::write(dir.join(name), data)?;
        }
        debug!(dir = %dir.display(), files = self.files.len(), "archive written");
        Ok(())
    }

    /// Read an archive directory. Every file besides the manifest and the
    /// document is taken as an auxiliary file.
    pub fn read_dir(dir: &Path) -> Result<Self, LoadError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(LoadError::MissingDocument(MANIFEST_FILE));
        }
        let manifest = parse_manifest(&fs::read_to_string(manifest_path)?)?;

        let document_path = dir.join(DOCUMENT_FILE);
        if !document_path.is_file() {
            return Err(LoadError::MissingDocument(DOCUMENT_FILE));
        }
        let document_xml = fs::read_to_string(document_path)?;

        let mut files = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if is_reserved(&name) {
                continue;
            }
            files.insert(name, fs::read(entry.path())?);
        }
        Ok(Self {
            manifest,
            document_xml,
            files,
        })
    }
}

fn is_reserved(name: &str) -> bool {
    name.eq_ignore_ascii_case(MANIFEST_FILE) || name.eq_ignore_ascii_case(DOCUMENT_FILE)
}
