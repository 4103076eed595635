//! Project layout configuration.
//!
//! Every installed package lives under `<root>/mlpm_modules/<name>/` with its
//! `mlpm.json` descriptor at the package root. [`ProjectConfig`] carries the
//! project root plus the few knobs the content pipeline and installer need.

use std::path::{Component, Path, PathBuf};

/// Directory under the project root holding installed packages.
pub const MODULES_DIR: &str = "mlpm_modules";

/// Package descriptor file name.
pub const MANIFEST_FILE: &str = "mlpm.json";

/// Deployment root prefixed to every file's `location`.
pub const DEPLOY_ROOT: &str = "/ext/";

/// Globs (relative to the package directory) never part of a deploy payload.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/mlpm.json",
    "**/CHANGELOG.md",
    "**/README.md",
    "**/README.mdown",
    "**/LICENSE",
];

/// Configuration for package content resolution and installation.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Project root; `mlpm_modules/` is resolved against it.
    ///
    /// Made absolute on construction so discovered paths are absolute too.
    pub root: PathBuf,

    /// Additional exclusion globs applied by file discovery, relative to the
    /// package directory.
    pub excludes: Vec<String>,

    /// Maximum concurrent file operations during fan-out.
    pub max_concurrent_io: usize,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: absolute(Path::new(".")),
            excludes: Vec::new(),
            max_concurrent_io: 16,
        }
    }
}

impl ProjectConfig {
    /// Create a new configuration rooted at the given project directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: absolute(root.as_ref()),
            ..Default::default()
        }
    }

    /// Add an exclusion glob to the configuration.
    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Set the maximum concurrent file operations (at least one).
    pub fn with_max_concurrent_io(mut self, max: usize) -> Self {
        self.max_concurrent_io = max.max(1);
        self
    }

    /// The `mlpm_modules` directory.
    pub fn modules_dir(&self) -> PathBuf {
        self.root.join(MODULES_DIR)
    }

    /// Install directory of the named package.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.modules_dir().join(name)
    }

    /// Descriptor path of the named package.
    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.package_dir(name).join(MANIFEST_FILE)
    }
}

/// Make `path` absolute and fold `.` and `..` lexically.
fn absolute(path: &Path) -> PathBuf {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    normalize_lexically(&path)
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// Discovery and deploy-config resolution both go through this, so paths
/// built from the same root compare equal.
pub(crate) fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert!(config.root.is_absolute());
        assert!(config.excludes.is_empty());
        assert_eq!(config.max_concurrent_io, 16);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ProjectConfig::new("/srv/app")
            .with_exclude("test/**")
            .with_exclude("**/*.bak")
            .with_max_concurrent_io(0);

        assert_eq!(config.root, PathBuf::from("/srv/app"));
        assert_eq!(config.excludes, vec!["test/**", "**/*.bak"]);
        assert_eq!(config.max_concurrent_io, 1);
    }

    #[test]
    fn test_derived_paths() {
        let config = ProjectConfig::new("/srv/app");

        assert_eq!(config.modules_dir(), PathBuf::from("/srv/app/mlpm_modules"));
        assert_eq!(
            config.package_dir("cts-extensions"),
            PathBuf::from("/srv/app/mlpm_modules/cts-extensions")
        );
        assert_eq!(
            config.manifest_path("cts-extensions"),
            PathBuf::from("/srv/app/mlpm_modules/cts-extensions/mlpm.json")
        );
    }

    #[test]
    fn test_root_parent_components_are_folded() {
        let config = ProjectConfig::new("/srv/app/sub/../other/./..");
        assert_eq!(config.root, PathBuf::from("/srv/app"));
        assert_eq!(config.modules_dir(), PathBuf::from("/srv/app/mlpm_modules"));
    }

    #[test]
    fn test_relative_root_is_made_absolute() {
        let config = ProjectConfig::new("project");
        assert!(config.root.is_absolute());
        assert!(config.root.ends_with("project"));
    }
}
