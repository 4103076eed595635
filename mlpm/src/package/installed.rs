//! Installed package detection.
//!
//! A package counts as installed when `mlpm_modules/<name>/mlpm.json` exists,
//! parses, and names the same package. A missing or foreign descriptor is a
//! normal "not installed" outcome rather than an error.

use std::io;

use crate::config::ProjectConfig;

use super::descriptor::PackageDescriptor;

/// Outcome of probing for an installed package.
#[derive(Debug, Clone, PartialEq)]
pub enum InstallStatus {
    /// The package is installed.
    Installed {
        /// The installed descriptor.
        descriptor: PackageDescriptor,
        /// Whether the installed version equals the requested one.
        version_matches: bool,
    },

    /// No descriptor, or a descriptor for a different package.
    NotInstalled,

    /// A descriptor exists but could not be read or parsed.
    Unreadable {
        /// Why the descriptor was rejected.
        reason: String,
    },
}

impl InstallStatus {
    /// Whether the package is installed, at any version.
    ///
    /// Unreadable descriptors count as not installed.
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }

    /// The installed descriptor, if any.
    pub fn descriptor(&self) -> Option<&PackageDescriptor> {
        match self {
            Self::Installed { descriptor, .. } => Some(descriptor),
            _ => None,
        }
    }

    /// Consume the status, yielding the installed descriptor.
    pub fn into_descriptor(self) -> Option<PackageDescriptor> {
        match self {
            Self::Installed { descriptor, .. } => Some(descriptor),
            _ => None,
        }
    }
}

/// Check whether `name` is installed and whether it is at `version`.
///
/// Acting on a version mismatch is left to the caller.
pub async fn probe_installed(config: &ProjectConfig, name: &str, version: &str) -> InstallStatus {
    match read_installed(config, name).await {
        Ok(Some(descriptor)) => {
            let version_matches = descriptor
                .version
                .as_deref()
                .is_some_and(|installed| versions_match(installed, version));

            tracing::debug!(
                package = name,
                installed = ?descriptor.version,
                requested = version,
                version_matches,
                "Package is installed"
            );

            InstallStatus::Installed {
                descriptor,
                version_matches,
            }
        }
        Ok(None) => InstallStatus::NotInstalled,
        Err(reason) => InstallStatus::Unreadable { reason },
    }
}

/// List every validly installed package, sorted by name.
///
/// Hidden directories and directories without a matching descriptor are
/// skipped. A missing `mlpm_modules` directory yields an empty list.
pub async fn list_installed(config: &ProjectConfig) -> io::Result<Vec<PackageDescriptor>> {
    let modules_dir = config.modules_dir();
    let mut entries = match tokio::fs::read_dir(&modules_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut packages = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();

        // Skip hidden folders
        if name.starts_with('.') {
            continue;
        }

        if let Ok(Some(descriptor)) = read_installed(config, &name).await {
            packages.push(descriptor);
        }
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(packages)
}

/// Read the descriptor of `name`, `None` when absent or foreign.
async fn read_installed(
    config: &ProjectConfig,
    name: &str,
) -> Result<Option<PackageDescriptor>, String> {
    let path = config.manifest_path(name);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read package descriptor");
            return Err(format!("failed to read {}: {}", path.display(), e));
        }
    };

    let descriptor = PackageDescriptor::from_json(&bytes).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Cannot parse package descriptor");
        format!("failed to parse {}: {}", path.display(), e)
    })?;

    if descriptor.name != name {
        tracing::debug!(
            path = %path.display(),
            expected = name,
            found = %descriptor.name,
            "Descriptor belongs to another package"
        );
        return Ok(None);
    }

    Ok(Some(descriptor))
}

/// Semantic-version equality when both sides parse, exact match otherwise.
fn versions_match(installed: &str, requested: &str) -> bool {
    match (
        semver::Version::parse(installed.trim()),
        semver::Version::parse(requested.trim()),
    ) {
        (Ok(installed), Ok(requested)) => installed == requested,
        _ => installed.trim() == requested.trim(),
    }
}
