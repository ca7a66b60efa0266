//! Error types for the ingestion and rendering pipeline.
//!
//! The store recovers per-document errors locally (see
//! [`Error::is_recoverable`]): the document is reported absent or
//! skipped. `FileSystem` and `Task` escape to callers as hard failures;
//! `Config` is raised only when building a store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while resolving, parsing or composing a document.
#[derive(Error, Debug)]
pub enum Error {
    /// Identifier does not resolve to any file under the content root.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Metadata block is present but not well-formed.
    #[error("malformed header at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    /// The `date` value is not a calendar date.
    #[error("invalid date: {value:?}")]
    InvalidDate { value: String },

    /// The document has no `date`, so it has no place in a listing.
    #[error("document has no date")]
    MissingDate,

    /// File exists but is not valid UTF-8.
    #[error("document is not valid UTF-8: {}", path.display())]
    InvalidEncoding { path: PathBuf },

    /// I/O failure other than a missing file.
    #[error("file system error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A per-document task panicked or was cancelled.
    #[error("document task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedHeader {
            line,
            reason: reason.into(),
        }
    }

    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Whether the store recovers this error by dropping the document.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::MalformedHeader { .. }
                | Self::InvalidDate { .. }
                | Self::MissingDate
                | Self::InvalidEncoding { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
