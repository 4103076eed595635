//! Error types for installing and removing packages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors that can occur while materializing or removing a package.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The package name is empty or is not a single path component.
    #[error("invalid package name '{0}'")]
    InvalidPackageName(String),

    /// The archive could not be decoded.
    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An archive entry could not be decompressed.
    #[error("failed to read archive entry {entry}: {source}")]
    ArchiveRead {
        entry: String,
        #[source]
        source: io::Error,
    },

    /// An archive entry would land outside the package directory.
    #[error("path traversal detected in archive entry {entry}")]
    PathTraversal { entry: String },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to remove an installed package.
    #[error("failed to remove {}: {source}", .path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A spawned write or decode task panicked or was aborted.
    #[error("install task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
