//! Package installation and removal.
//!
//! Installing decodes a zip archive held in memory and writes every entry
//! under `<base>/<package>/`. Writes run concurrently, bounded by
//! [`ProjectConfig::max_concurrent_io`]. The first failed write is reported;
//! entries already written stay on disk, so a failed install can leave a
//! partial tree behind. An existing install directory is not cleared first,
//! so reinstalling overlays the previous contents.
//!
//! Concurrent install and uninstall of the same package are not synchronized
//! and must be serialized by the caller.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::Semaphore;

use crate::config::ProjectConfig;

use super::error::{ManagerError, ManagerResult};
use super::extractor::{read_zip, ArchiveEntry, EntryKind};

/// Where a package archive is materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    /// Package name; the directory created under `base`.
    pub package: String,
    /// Directory holding installed packages.
    pub base: PathBuf,
}

impl InstallTarget {
    /// Target an arbitrary base directory.
    pub fn new(package: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        Self {
            package: package.into(),
            base: base.into(),
        }
    }

    /// Target the project's `mlpm_modules` directory.
    pub fn in_project(config: &ProjectConfig, package: impl Into<String>) -> Self {
        Self::new(package, config.modules_dir())
    }

    /// The package's install directory.
    pub fn package_dir(&self) -> PathBuf {
        self.base.join(&self.package)
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Installed package name.
    pub package: String,
    /// Directory the archive was written to.
    pub install_dir: PathBuf,
    /// Number of regular files written.
    pub files_written: usize,
}

/// Materialize a zip archive into the target's package directory.
///
/// Every entry name is validated before anything is written; entries that
/// are absolute or climb out with `..` fail the install with
/// [`ManagerError::PathTraversal`]. File contents are written byte for byte.
pub async fn install(
    config: &ProjectConfig,
    archive: Vec<u8>,
    target: &InstallTarget,
) -> ManagerResult<InstallReport> {
    validate_package_name(&target.package)?;

    let entries = tokio::task::spawn_blocking(move || read_zip(&archive)).await??;
    let install_dir = target.package_dir();
    let files_written = entries.iter().filter(|e| e.is_file()).count();

    tracing::debug!(
        package = %target.package,
        dir = %install_dir.display(),
        entries = entries.len(),
        "Writing package archive"
    );

    let limiter = Arc::new(Semaphore::new(config.max_concurrent_io));

    let writes: Vec<_> = entries
        .into_iter()
        .map(|entry| {
            let install_dir = install_dir.clone();
            let limiter = Arc::clone(&limiter);

            tokio::spawn(async move {
                let _permit = limiter.acquire().await;
                write_entry(&install_dir, entry).await
            })
        })
        .collect();

    try_join_all(writes.into_iter().map(|write| async move { write.await? })).await?;

    tracing::info!(
        package = %target.package,
        dir = %install_dir.display(),
        files = files_written,
        "Installed package"
    );

    Ok(InstallReport {
        package: target.package.clone(),
        install_dir,
        files_written,
    })
}

/// Remove an installed package directory and everything beneath it.
///
/// Removing a package that is not installed succeeds.
pub async fn uninstall(config: &ProjectConfig, name: &str) -> ManagerResult<()> {
    validate_package_name(name)?;

    let package_dir = config.package_dir(name);

    match tokio::fs::remove_dir_all(&package_dir).await {
        Ok(()) => {
            tracing::info!(package = name, dir = %package_dir.display(), "Uninstalled package");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(package = name, "Package not installed, nothing to remove");
            Ok(())
        }
        Err(e) => Err(ManagerError::RemoveFailed {
            path: package_dir,
            source: e,
        }),
    }
}

/// Write a single entry under `install_dir`.
async fn write_entry(install_dir: &Path, entry: ArchiveEntry) -> ManagerResult<()> {
    let path = install_dir.join(&entry.path);

    match entry.kind {
        EntryKind::Directory => create_dir_all(&path).await,
        EntryKind::File(contents) => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, contents)
                .await
                .map_err(|e| ManagerError::WriteFailed { path, source: e })
        }
    }
}

async fn create_dir_all(path: &Path) -> ManagerResult<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| ManagerError::CreateDirFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// A package name must be exactly one normal path component.
fn validate_package_name(name: &str) -> ManagerResult<()> {
    let mut components = Path::new(name).components();

    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ManagerError::InvalidPackageName(name.to_string())),
    }
}
