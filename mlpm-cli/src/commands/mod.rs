//! CLI subcommands.
//!
//! Each handler writes its user-facing output to the supplied writer and logs
//! through `tracing`; `main` passes stdout.

mod install;
mod query;

use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;

use mlpm::ProjectConfig;

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a package from a zip archive
    Install {
        /// Path to the package archive
        archive: PathBuf,

        /// Name to install the package under
        #[arg(long)]
        package: String,
    },

    /// Remove an installed package
    Uninstall {
        /// Package name
        name: String,
    },

    /// Show whether a package is installed
    Status {
        /// Package name
        name: String,

        /// Version to compare against the installed one
        #[arg(long)]
        version: Option<String>,
    },

    /// Print the ordered deploy payload of an installed package as JSON
    Contents {
        /// Package name
        name: String,
    },

    /// List installed packages
    List,
}

/// Run a subcommand against the given project.
pub async fn run(
    config: &ProjectConfig,
    command: Commands,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Commands::Install { archive, package } => {
            install::install(config, &archive, &package, out).await
        }
        Commands::Uninstall { name } => install::uninstall(config, &name, out).await,
        Commands::Status { name, version } => {
            query::status(config, &name, version.as_deref(), out).await
        }
        Commands::Contents { name } => query::contents(config, &name, out).await,
        Commands::List => query::list(config, out).await,
    }
}
