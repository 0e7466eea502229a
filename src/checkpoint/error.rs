use std::path::PathBuf;

pub type CheckpointResult<T> = Result<T, CheckpointError>;

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Runs are never overwritten.
    #[error("Run directory already exists: {}", .0.display())]
    RunExists(PathBuf),

    #[error("Run directory not found: {}", .0.display())]
    RunNotFound(PathBuf),

    /// The file could not be parsed and was left untouched.
    #[error("Checkpoint file is corrupt: {}", .0.display())]
    Corrupt(PathBuf),
}

impl CheckpointError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
