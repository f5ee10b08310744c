use object_graph::{Document, LoadDiagnostic, LoadOptions};
use tracing::{debug, instrument};

use crate::archive::ProjectArchive;
use crate::errors::LoadError;
use crate::metadata::ProjectMetadata;
use crate::save::{Manifest, FORMAT_ID, FORMAT_VERSION};

/// A project read back from an archive.
#[derive(Debug)]
pub struct LoadedProject {
    pub document: Document,
    pub metadata: ProjectMetadata,
    /// Recoverable problems met while reading the document.
    pub diagnostics: Vec<LoadDiagnostic>,
}

/// Deserialize a manifest from JSON.
pub fn parse_manifest(json: &str) -> Result<Manifest, LoadError> {
    serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))
}

/// Rebuild the document stored in an archive.
///
/// Validates the format identifier and version; older versions are
/// migrated first.
#[instrument(skip_all, fields(project = %archive.manifest.project.name))]
pub fn load_project(
    archive: &ProjectArchive,
    options: &LoadOptions,
) -> Result<LoadedProject, LoadError> {
    let manifest = &archive.manifest;
    check_manifest(manifest)?;

    let migrated;
    let xml = if manifest.version < FORMAT_VERSION {
        migrated = crate::migrate::migrate(&archive.document_xml, manifest.version, FORMAT_VERSION)?;
        migrated.as_str()
    } else {
        archive.document_xml.as_str()
    };

    let loaded = Document::load_xml(xml, &archive.files, options)?;
    debug!(
        objects = loaded.document.len(),
        diagnostics = loaded.diagnostics.len(),
        "project loaded"
    );
    Ok(LoadedProject {
        document: loaded.document,
        metadata: manifest.project.clone(),
        diagnostics: loaded.diagnostics,
    })
}

fn check_manifest(manifest: &Manifest) -> Result<(), LoadError> {
    if manifest.format != FORMAT_ID {
        return Err(LoadError::UnknownFormat(manifest.format.clone()));
    }
    if manifest.version > FORMAT_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: manifest.version,
            supported_version: FORMAT_VERSION,
        });
    }
    Ok(())
}
