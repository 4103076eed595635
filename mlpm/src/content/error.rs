//! Error types for package content resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::metadata::FileMetadata;

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors that can occur while discovering and classifying package files.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The descriptor's `deploy` field has an unsupported shape.
    #[error("invalid deploy config: {0}")]
    InvalidDeployConfig(String),

    /// A discovered file does not live under `mlpm_modules`.
    #[error(
        "path parsing error: {} does not resolve under mlpm_modules ({})",
        .metadata.relative_path.display(),
        .metadata.path.display()
    )]
    PathIntegrity { metadata: Box<FileMetadata> },

    /// A line starts a module declaration but no namespace could be captured.
    #[error("malformed module declaration at {}:{line_number}: {line}", .path.display())]
    ModuleDeclaration {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    /// An exclusion or discovery glob failed to compile.
    #[error("invalid glob pattern {pattern}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Enumerating the package directory failed.
    #[error("failed to enumerate {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read a package file.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A spawned classification task panicked or was aborted.
    #[error("classification task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_deploy_config_display() {
        let err = ContentError::InvalidDeployConfig("expected a list or a map".to_string());
        assert_eq!(
            err.to_string(),
            "invalid deploy config: expected a list or a map"
        );
    }

    #[test]
    fn test_module_declaration_display() {
        let err = ContentError::ModuleDeclaration {
            path: PathBuf::from("/p/mlpm_modules/x/lib.xqy"),
            line_number: 3,
            line: "module namespace broken;".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("/p/mlpm_modules/x/lib.xqy:3"));
        assert!(message.contains("module namespace broken;"));
    }

    #[test]
    fn test_read_failed_exposes_source() {
        use std::error::Error as _;

        let err = ContentError::ReadFailed {
            path: PathBuf::from("/missing"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
    }
}
