//! Package installation and removal.
//!
//! Materializes package archives under `mlpm_modules/<name>/` and removes
//! them again.
//!
//! # Example
//!
//! ```ignore
//! use mlpm::config::ProjectConfig;
//! use mlpm::manager::{install, uninstall, InstallTarget};
//!
//! let config = ProjectConfig::new("/srv/app");
//! let archive = std::fs::read("search-ext.zip")?;
//!
//! let report = install(&config, archive, &InstallTarget::in_project(&config, "search-ext")).await?;
//! println!("{} files in {}", report.files_written, report.install_dir.display());
//!
//! uninstall(&config, "search-ext").await?;
//! ```

mod error;
mod extractor;
mod installer;

pub use error::{ManagerError, ManagerResult};
pub use extractor::{read_zip, ArchiveEntry, EntryKind};
pub use installer::{install, uninstall, InstallReport, InstallTarget};
