//! Zip archive decoding.
//!
//! The whole archive is decoded and every entry name validated before the
//! installer writes anything, so a hostile entry aborts the install with
//! nothing on disk.

use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use super::error::{ManagerError, ManagerResult};

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 1 << 20;

/// One decoded archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry path relative to the package directory.
    pub path: PathBuf,
    /// Entry payload.
    pub kind: EntryKind,
}

/// Payload of an [`ArchiveEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file and its bytes.
    File(Vec<u8>),
    /// An explicit directory entry.
    Directory,
}

impl ArchiveEntry {
    /// Whether this entry is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File(_))
    }
}

/// Decode every entry of an in-memory zip archive.
///
/// Fails with [`ManagerError::PathTraversal`] for entries whose names are
/// absolute or climb out of the archive root.
pub fn read_zip(bytes: &[u8]) -> ManagerResult<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let name = file.name().to_string();

        let path = file
            .enclosed_name()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| ManagerError::PathTraversal {
                entry: name.clone(),
            })?;
        validate_entry_path(&name, &path)?;

        let kind = if file.is_dir() {
            EntryKind::Directory
        } else {
            let mut contents = Vec::with_capacity(file.size().min(MAX_PREALLOC) as usize);
            file.read_to_end(&mut contents)
                .map_err(|e| ManagerError::ArchiveRead {
                    entry: name.clone(),
                    source: e,
                })?;
            EntryKind::File(contents)
        };

        entries.push(ArchiveEntry { path, kind });
    }

    Ok(entries)
}

/// Reject absolute paths and `..` components.
fn validate_entry_path(name: &str, path: &Path) -> ManagerResult<()> {
    let escapes = path.is_absolute()
        || path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

    if escapes {
        return Err(ManagerError::PathTraversal {
            entry: name.to_string(),
        });
    }

    Ok(())
}
