//! Package file discovery.
//!
//! Lists every regular file under `mlpm_modules/<name>/` except descriptors,
//! changelogs, readmes and licenses (see [`DEFAULT_EXCLUDES`]) and anything the
//! project or caller excludes. Hidden files and directories are skipped.
//!
//! The returned order is not significant; the content pipeline imposes the
//! deployment order afterwards.

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::config::{ProjectConfig, DEFAULT_EXCLUDES};

use super::error::{ContentError, ContentResult};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Discover the deployable files of an installed package.
///
/// `excludes` are globs relative to the package directory (a leading `/` is
/// accepted) and are applied on top of the defaults and
/// [`ProjectConfig::excludes`]. Any enumeration error aborts discovery.
pub async fn discover_files(
    config: &ProjectConfig,
    name: &str,
    excludes: &[String],
) -> ContentResult<Vec<PathBuf>> {
    let package_dir = config.package_dir(name);
    let patterns = exclusion_patterns(config.excludes.iter().chain(excludes))?;

    let files =
        tokio::task::spawn_blocking(move || walk_package(&package_dir, &patterns)).await??;

    tracing::debug!(package = name, files = files.len(), "Discovered package files");
    Ok(files)
}

/// Compile the default exclusions plus `extra`, deduplicated.
fn exclusion_patterns<'a>(
    extra: impl IntoIterator<Item = &'a String>,
) -> ContentResult<Vec<Pattern>> {
    let mut sources: Vec<&str> = DEFAULT_EXCLUDES.to_vec();
    for pattern in extra {
        let pattern = pattern.trim_start_matches('/');
        if !sources.contains(&pattern) {
            sources.push(pattern);
        }
    }

    sources
        .into_iter()
        .map(|source| {
            Pattern::new(source).map_err(|e| ContentError::Glob {
                pattern: source.to_string(),
                source: e,
            })
        })
        .collect()
}

/// Walk `package_dir/**/*`, keeping regular files that match no exclusion.
fn walk_package(package_dir: &Path, excludes: &[Pattern]) -> ContentResult<Vec<PathBuf>> {
    let pattern = format!("{}/**/*", Pattern::escape(&package_dir.to_string_lossy()));
    let entries = glob::glob_with(&pattern, MATCH_OPTIONS).map_err(|e| ContentError::Glob {
        pattern: pattern.clone(),
        source: e,
    })?;

    let mut files = Vec::new();

    for entry in entries {
        let path = entry.map_err(|e| ContentError::Discovery {
            path: e.path().to_path_buf(),
            source: e.into_error(),
        })?;

        let Ok(relative) = path.strip_prefix(package_dir) else {
            continue;
        };

        if is_hidden(relative) {
            continue;
        }

        if excludes
            .iter()
            .any(|exclude| exclude.matches_path_with(relative, MATCH_OPTIONS))
        {
            continue;
        }

        // Symlinks and directories are not part of the payload
        let file_type = std::fs::symlink_metadata(&path)
            .map_err(|source| ContentError::Discovery {
                path: path.clone(),
                source,
            })?
            .file_type();

        if file_type.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn project_with(files: &[&str]) -> (TempDir, ProjectConfig) {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::new(temp.path());
        for file in files {
            let path = config.package_dir("pkg").join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }
        (temp, config)
    }

    fn relative(config: &ProjectConfig, files: Vec<PathBuf>) -> Vec<String> {
        let mut names: Vec<String> = files
            .iter()
            .map(|f| {
                f.strip_prefix(config.package_dir("pkg"))
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_default_exclusions() {
        let (_temp, config) = project_with(&["mlpm.json", "README.md", "lib/a.xqy"]);

        let files = discover_files(&config, "pkg", &[]).await.unwrap();

        assert_eq!(relative(&config, files), vec!["lib/a.xqy"]);
    }

    #[tokio::test]
    async fn test_nested_defaults_excluded() {
        let (_temp, config) = project_with(&[
            "CHANGELOG.md",
            "LICENSE",
            "docs/README.mdown",
            "vendor/dep/mlpm.json",
            "vendor/dep/lib.xqy",
        ]);

        let files = discover_files(&config, "pkg", &[]).await.unwrap();

        assert_eq!(relative(&config, files), vec!["vendor/dep/lib.xqy"]);
    }

    #[tokio::test]
    async fn test_paths_are_absolute() {
        let (_temp, config) = project_with(&["lib/a.xqy"]);

        let files = discover_files(&config, "pkg", &[]).await.unwrap();

        assert_eq!(files.len(), 1);
        assert!(files[0].is_absolute());
        assert!(files[0].starts_with(config.modules_dir()));
    }

    #[tokio::test]
    async fn test_caller_exclusions() {
        let (_temp, config) = project_with(&["lib/a.xqy", "test/a-test.xqy", "notes.bak"]);
        let excludes = vec!["/test/**/*".to_string(), "**/*.bak".to_string()];

        let files = discover_files(&config, "pkg", &excludes).await.unwrap();

        assert_eq!(relative(&config, files), vec!["lib/a.xqy"]);
    }

    #[tokio::test]
    async fn test_config_exclusions() {
        let (_temp, config) = project_with(&["lib/a.xqy", "lib/a.xqy.orig"]);
        let config = config.with_exclude("**/*.orig");

        let files = discover_files(&config, "pkg", &[]).await.unwrap();

        assert_eq!(relative(&config, files), vec!["lib/a.xqy"]);
    }

    #[tokio::test]
    async fn test_directories_and_hidden_files_skipped() {
        let (_temp, config) = project_with(&["lib/a.xqy", ".gitignore", ".git/HEAD"]);
        fs::create_dir_all(config.package_dir("pkg").join("empty")).unwrap();

        let files = discover_files(&config, "pkg", &[]).await.unwrap();

        assert_eq!(relative(&config, files), vec!["lib/a.xqy"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinks_skipped() {
        let (temp, config) = project_with(&["lib/a.xqy"]);
        let outside = temp.path().join("outside.xqy");
        fs::write(&outside, "x").unwrap();
        std::os::unix::fs::symlink(&outside, config.package_dir("pkg").join("link.xqy")).unwrap();

        let files = discover_files(&config, "pkg", &[]).await.unwrap();

        assert_eq!(relative(&config, files), vec!["lib/a.xqy"]);
    }

    #[tokio::test]
    async fn test_missing_package_is_empty() {
        let (_temp, config) = project_with(&[]);

        let files = discover_files(&config, "absent", &[]).await.unwrap();

        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_exclusion_pattern() {
        let (_temp, config) = project_with(&["lib/a.xqy"]);

        let err = discover_files(&config, "pkg", &["[".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::Glob { .. }));
    }
}
