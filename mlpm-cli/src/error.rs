//! CLI error type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use mlpm::{ContentError, ManagerError};

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid invocation or project state.
    #[error("{0}")]
    Config(String),

    /// The archive file could not be read.
    #[error("failed to read archive {}: {source}", .path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Content resolution failed.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Install or uninstall failed.
    #[error(transparent)]
    Manager(#[from] ManagerError),

    /// Writing output or listing packages failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Serializing output failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}
