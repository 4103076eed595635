//! mlpm - package manager core for MarkLogic script modules
//!
//! This library resolves the deployable content of installed packages and
//! materializes package archives on disk.
//!
//! - [`content`]: discovers, classifies and orders a package's files
//! - [`manager`]: installs and uninstalls package archives
//! - [`package`]: package descriptors and installed-package probing
//! - [`config`]: project layout

pub mod config;
pub mod content;
pub mod manager;
pub mod package;

pub use config::ProjectConfig;
pub use content::{prepare_deploy, ContentError, FileMetadata, FileType};
pub use manager::{install, uninstall, InstallTarget, ManagerError};
pub use package::{probe_installed, InstallStatus, PackageDescriptor};
