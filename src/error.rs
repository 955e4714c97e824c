use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("{} not found or unreadable: {source}", .path.display())]
    DatasetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid record dataset: {source}", .path.display())]
    DatasetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("overrides file {} could not be read: {source}", .path.display())]
    OverridesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("overrides file {} is malformed: {source}", .path.display())]
    OverridesParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("HMA source {} could not be read: {source}", .path.display())]
    HmaSourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no record named '{0}'")]
    UnknownRecord(String),

    #[error("unknown field '{0}'")]
    #[allow(dead_code)] // only the command-line editor names fields
    UnknownField(String),

    #[error("no custom records to export")]
    NothingToExport,

    #[error("failed to write {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EditorError>;
