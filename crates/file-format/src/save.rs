use object_graph::{Document, SaveOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::archive::{ProjectArchive, DOCUMENT_FILE, MANIFEST_FILE};
use crate::errors::SaveError;
use crate::metadata::ProjectMetadata;

/// Format identifier written to every manifest.
pub const FORMAT_ID: &str = "object-graph";

/// Current archive format version.
pub const FORMAT_VERSION: u32 = 1;

/// The manifest stored as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Format identifier.
    pub format: String,
    /// Format version number.
    pub version: u32,
    /// Project metadata.
    pub project: ProjectMetadata,
    /// Options the document was written with.
    pub save_options: SaveOptions,
}

impl Manifest {
    pub fn new(project: ProjectMetadata, save_options: SaveOptions) -> Self {
        Self {
            format: FORMAT_ID.to_string(),
            version: FORMAT_VERSION,
            project,
            save_options,
        }
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self).map_err(|e| SaveError::Serialize(e.to_string()))
    }
}

/// Serialize a document into an in-memory archive.
#[instrument(skip_all, fields(project = %metadata.name))]
pub fn save_project(
    doc: &Document,
    metadata: &ProjectMetadata,
    options: &SaveOptions,
) -> Result<ProjectArchive, SaveError> {
    let saved = doc.save_xml_reserving(options, &[MANIFEST_FILE, DOCUMENT_FILE])?;
    debug!(files = saved.files.len(), "project saved");
    Ok(ProjectArchive {
        manifest: Manifest::new(metadata.clone(), options.clone()),
        document_xml: saved.xml,
        files: saved.files,
    })
}
