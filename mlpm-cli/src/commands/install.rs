//! `install` and `uninstall`.

use std::io::Write;
use std::path::Path;

use mlpm::manager::{self, InstallTarget};
use mlpm::ProjectConfig;

use crate::error::CliError;

pub async fn install(
    config: &ProjectConfig,
    archive: &Path,
    package: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let bytes = tokio::fs::read(archive)
        .await
        .map_err(|e| CliError::ArchiveRead {
            path: archive.to_path_buf(),
            source: e,
        })?;

    let target = InstallTarget::in_project(config, package);
    let report = manager::install(config, bytes, &target).await?;

    writeln!(
        out,
        "Installed {} ({} files) to {}",
        report.package,
        report.files_written,
        report.install_dir.display()
    )?;
    Ok(())
}

pub async fn uninstall(
    config: &ProjectConfig,
    name: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    manager::uninstall(config, name).await?;
    writeln!(out, "Removed {}", name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[tokio::test]
    async fn test_install_missing_archive() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::new(temp.path());
        let mut out = Vec::new();

        let err = install(&config, &temp.path().join("nope.zip"), "pkg", &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, CliError::ArchiveRead { .. }));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_uninstall_reports_removal() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::new(temp.path());
        let mut out = Vec::new();

        uninstall(&config, "pkg", &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Removed pkg\n");
    }
}
