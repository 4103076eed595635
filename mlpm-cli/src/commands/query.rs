//! Read-only commands: `status`, `contents` and `list`.

use std::io::Write;

use mlpm::package::{list_installed, probe_installed, InstallStatus};
use mlpm::{prepare_deploy, ProjectConfig};

use crate::error::CliError;

pub async fn status(
    config: &ProjectConfig,
    name: &str,
    version: Option<&str>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match probe_installed(config, name, version.unwrap_or_default()).await {
        InstallStatus::Installed {
            descriptor,
            version_matches,
        } => {
            let installed = descriptor.version.as_deref().unwrap_or("unversioned");
            match version {
                Some(wanted) if !version_matches => writeln!(
                    out,
                    "{} {} is installed (wanted {})",
                    name, installed, wanted
                )?,
                _ => writeln!(out, "{} {} is installed", name, installed)?,
            }
        }
        InstallStatus::NotInstalled => writeln!(out, "{} is not installed", name)?,
        InstallStatus::Unreadable { reason } => {
            writeln!(out, "{} is not installed ({})", name, reason)?
        }
    }
    Ok(())
}

pub async fn contents(
    config: &ProjectConfig,
    name: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let status = probe_installed(config, name, "").await;
    if let InstallStatus::Unreadable { reason } = &status {
        return Err(CliError::Config(reason.clone()));
    }
    let descriptor = status
        .into_descriptor()
        .ok_or_else(|| CliError::Config(format!("{} is not installed", name)))?;

    let prepared = prepare_deploy(config, descriptor).await?;
    let files = prepared.prepared_deploy.unwrap_or_default();

    serde_json::to_writer_pretty(&mut *out, &files)?;
    writeln!(out)?;
    Ok(())
}

pub async fn list(config: &ProjectConfig, out: &mut impl Write) -> Result<(), CliError> {
    let packages = list_installed(config).await?;

    if packages.is_empty() {
        writeln!(out, "No packages installed")?;
        return Ok(());
    }

    for package in packages {
        match package.version {
            Some(version) => writeln!(out, "{} {}", package.name, version)?,
            None => writeln!(out, "{}", package.name)?,
        }
    }
    Ok(())
}
