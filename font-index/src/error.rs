use std::path::PathBuf;

use thiserror::Error;

use crate::encoding::DecodeError;

/// Errors that abort a scan or an index build.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to decode name for '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: DecodeError,
    },

    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("error accessing '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error walking font directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid index: {0}")]
    InvalidIndex(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
