//! mlpm CLI - install and inspect MarkLogic script module packages.

mod commands;
mod error;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mlpm::ProjectConfig;

use commands::Commands;

#[derive(Debug, Parser)]
#[command(name = "mlpm", version, about = "MarkLogic package manager")]
struct Cli {
    /// Project root containing mlpm_modules/ (defaults to the current directory)
    #[arg(long, global = true, env = "MLPM_ROOT")]
    root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn project_config(&self) -> ProjectConfig {
        match &self.root {
            Some(root) => ProjectConfig::new(root),
            None => ProjectConfig::default(),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.project_config();
    let mut stdout = io::stdout().lock();

    match commands::run(&config, cli.command, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
