//! Content pipeline: discovery, classification and deployment ordering.
//!
//! ```text
//! discover_files ──► normalize_deploy ──► assemble_metadata (one task per file)
//!                                                   │
//!                                     try_join_all (first error wins)
//!                                                   │
//!                                          order_for_deploy
//! ```
//!
//! Classification tasks run concurrently, bounded by
//! [`ProjectConfig::max_concurrent_io`]. Results are collected in discovery
//! order regardless of completion order, so the final list depends only on
//! discovery order and the classified types. When one file fails the whole
//! build fails; tasks already running are left to finish on their own.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::Semaphore;

use crate::config::ProjectConfig;
use crate::package::PackageDescriptor;

use super::deploy::{normalize_deploy, DeployOverride};
use super::discovery::discover_files;
use super::error::ContentResult;
use super::metadata::{assemble_metadata, FileMetadata};

/// Classify every deployable file of an installed package.
///
/// Returns the descriptor with `prepared_deploy` set to the ordered file list.
/// The descriptor's `deploy` field, when present, is normalized first and its
/// overrides merged into the matching files.
pub async fn prepare_deploy(
    config: &ProjectConfig,
    mut descriptor: PackageDescriptor,
) -> ContentResult<PackageDescriptor> {
    let paths = discover_files(config, &descriptor.name, &[]).await?;

    let overrides = match &descriptor.deploy {
        Some(deploy) => normalize_deploy(config, &descriptor.name, deploy)?,
        None => HashMap::new(),
    };

    let files = assemble_all(config, paths, overrides).await?;
    let prepared = order_for_deploy(files);

    tracing::info!(
        package = %descriptor.name,
        files = prepared.len(),
        endpoints = prepared.iter().filter(|f| f.is_endpoint()).count(),
        "Prepared package for deployment"
    );

    descriptor.prepared_deploy = Some(prepared);
    Ok(descriptor)
}

/// Move resources and transforms after every other file.
///
/// The sort is stable: relative order within each group is preserved.
pub fn order_for_deploy(mut files: Vec<FileMetadata>) -> Vec<FileMetadata> {
    files.sort_by_key(FileMetadata::is_endpoint);
    files
}

/// Assemble metadata for every path concurrently, keeping input order.
async fn assemble_all(
    config: &ProjectConfig,
    paths: Vec<PathBuf>,
    mut overrides: HashMap<PathBuf, DeployOverride>,
) -> ContentResult<Vec<FileMetadata>> {
    let config = Arc::new(config.clone());
    let limiter = Arc::new(Semaphore::new(config.max_concurrent_io));

    let tasks: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let deploy = overrides.remove(&path);
            let config = Arc::clone(&config);
            let limiter = Arc::clone(&limiter);

            tokio::spawn(async move {
                let _permit = limiter.acquire().await;
                assemble_metadata(&config, path, deploy.as_ref()).await
            })
        })
        .collect();

    // Dropping a JoinHandle detaches its task rather than cancelling it
    try_join_all(tasks.into_iter().map(|task| async move { task.await? })).await
}
