use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read data file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Data file {path} is corrupted: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize projects: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },

    #[error("Failed to write data file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Data file {path} has no parent directory")]
    MissingDirectory { path: PathBuf },
}
