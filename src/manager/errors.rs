use crate::storage::errors::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("A project name is required for this command")]
    MissingProjectName,

    #[error("Project '{name}' does not exist")]
    NoSuchProject { name: String },

    #[error("Project '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("Session {id} does not exist")]
    NoSuchSession { id: i64 },

    #[error("A session of {hours} hours reaches too far into the past")]
    InvalidHours { hours: u32 },

    #[error("Storage operation failed: {source}")]
    Storage {
        #[from]
        source: StorageError,
    },

    #[error("IO operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TrackerError {
    /// Errors caused by what the user asked for, as opposed to the environment failing.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TrackerError::MissingProjectName
                | TrackerError::NoSuchProject { .. }
                | TrackerError::AlreadyExists { .. }
                | TrackerError::NoSuchSession { .. }
                | TrackerError::InvalidHours { .. }
        )
    }
}
