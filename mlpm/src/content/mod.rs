//! Package content resolution.
//!
//! Turns an installed package directory into an ordered list of classified
//! files ready for deployment.
//!
//! # Overview
//!
//! - **Format**: coarse format tag from the file extension
//! - **Introspection**: XQuery line scanner distinguishing library modules,
//!   REST resources and transforms from main modules
//! - **Discovery**: enumerates the package payload, minus exclusions
//! - **Deploy config**: normalizes author overrides from `mlpm.json`
//! - **Metadata**: merges the above into one [`FileMetadata`] per file
//! - **Pipeline**: runs everything and orders endpoints last
//!
//! # Example
//!
//! ```ignore
//! use mlpm::config::ProjectConfig;
//! use mlpm::content::prepare_deploy;
//! use mlpm::package::PackageDescriptor;
//!
//! let config = ProjectConfig::new("/srv/app");
//! let descriptor = PackageDescriptor::new("search-ext");
//! let prepared = prepare_deploy(&config, descriptor).await?;
//!
//! for file in prepared.prepared_deploy.unwrap_or_default() {
//!     println!("{} -> {}", file.kind, file.location);
//! }
//! ```

mod deploy;
mod discovery;
mod error;
mod format;
mod introspect;
mod metadata;
mod pipeline;

pub use deploy::{normalize_deploy, DeployConfig, DeployOverride};
pub use discovery::discover_files;
pub use error::{ContentError, ContentResult};
pub use format::Format;
pub use introspect::{
    introspect_module, scan_lines, ModuleInfo, ModuleKind, RESOURCE_NS, TRANSFORM_NS,
};
pub use metadata::{assemble_metadata, FileMetadata, FileType};
pub use pipeline::{order_for_deploy, prepare_deploy};
