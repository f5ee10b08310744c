use object_graph::DocumentError;

/// Errors during project loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse manifest: {0}")]
    ParseError(String),

    #[error("unknown file format: {0}")]
    UnknownFormat(String),

    #[error("file version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },

    #[error("migration failed from version {from} to {to}: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },

    #[error("archive has no {0}")]
    MissingDocument(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Errors during project saving.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("failed to serialize manifest: {0}")]
    Serialize(String),

    #[error("auxiliary file '{0}' would overwrite an archive file")]
    ReservedFileName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}
