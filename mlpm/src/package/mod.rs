//! Package descriptors and installed-package detection.
//!
//! # Layout
//!
//! ```text
//! <root>/mlpm_modules/
//! ├── search-ext/
//! │   ├── mlpm.json        # PackageDescriptor
//! │   └── lib/...          # payload
//! └── other-package/
//!     └── ...
//! ```

mod descriptor;
mod installed;

pub use descriptor::PackageDescriptor;
pub use installed::{list_installed, probe_installed, InstallStatus};
