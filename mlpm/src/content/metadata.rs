//! Per-file deployment metadata.
//!
//! A [`FileMetadata`] starts as a plain `asset` derived from the file's path,
//! then deploy-config overrides are merged over it, and finally XQuery
//! introspection (for `xqy` files) has the last word on `type`, `ns` and
//! `name`.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{ProjectConfig, DEPLOY_ROOT, MODULES_DIR};

use super::deploy::DeployOverride;
use super::error::{ContentError, ContentResult};
use super::format::Format;
use super::introspect::{introspect_module, ModuleInfo, ModuleKind};

/// Deployment role of a package file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Static asset or main module, deployed as-is.
    #[default]
    Asset,
    /// Library module.
    Module,
    /// REST API resource extension.
    Resource,
    /// REST API transform.
    Transform,
}

impl FileType {
    /// Resource and transform endpoints deploy after everything else.
    pub fn is_endpoint(self) -> bool {
        matches!(self, Self::Resource | Self::Transform)
    }

    /// Lowercase name used in descriptors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Module => "module",
            Self::Resource => "resource",
            Self::Transform => "transform",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(Self::Asset),
            "module" => Ok(Self::Module),
            "resource" => Ok(Self::Resource),
            "transform" => Ok(Self::Transform),
            other => Err(format!(
                "unknown file type '{}' (expected asset, module, resource or transform)",
                other
            )),
        }
    }
}

impl From<ModuleKind> for FileType {
    fn from(kind: ModuleKind) -> Self {
        match kind {
            ModuleKind::Module => Self::Module,
            ModuleKind::Resource => Self::Resource,
            ModuleKind::Transform => Self::Transform,
        }
    }
}

/// Deployment metadata for one package file.
///
/// Serializes with the descriptor's camelCase names; `extra` holds any other
/// attributes a deploy override attached and is flattened into the object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Deployment role.
    #[serde(rename = "type")]
    pub kind: FileType,

    /// Absolute on-disk path.
    pub path: PathBuf,

    /// Path relative to the project root, starting with `mlpm_modules`.
    pub relative_path: PathBuf,

    /// Format tag derived from the extension.
    pub format: Format,

    /// Deployment target, always `/ext/` followed by a forward-slash path.
    pub location: String,

    /// Declared module namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ns: Option<String>,

    /// Resource or transform name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Author-defined attributes from the deploy config.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileMetadata {
    /// Base `asset` metadata for a file, before overrides or introspection.
    pub fn new(config: &ProjectConfig, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let relative_path = path
            .strip_prefix(&config.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());
        let format = Format::from_path(&path.to_string_lossy());
        let location = format!("{}{}", DEPLOY_ROOT, forward_slashes(&relative_path));

        Self {
            kind: FileType::Asset,
            path,
            relative_path,
            format,
            location,
            ns: None,
            name: None,
            extra: Map::new(),
        }
    }

    /// Whether this file deploys in the endpoint phase.
    pub fn is_endpoint(&self) -> bool {
        self.kind.is_endpoint()
    }

    /// Fail unless the relative path starts with the `mlpm_modules` segment.
    pub fn verify_under_modules(self) -> ContentResult<Self> {
        if self.relative_path.starts_with(MODULES_DIR) {
            Ok(self)
        } else {
            Err(ContentError::PathIntegrity {
                metadata: Box::new(self),
            })
        }
    }

    /// Merge a deploy override over this metadata; the override wins.
    ///
    /// `path` and `relativePath` identify the file and are never overridden.
    pub fn apply_override(&mut self, deploy: &DeployOverride) {
        if let Some(kind) = deploy.kind {
            self.kind = kind;
        }
        if let Some(format) = &deploy.format {
            self.format = format.clone();
        }
        if let Some(location) = &deploy.location {
            self.location = location.clone();
        }
        if let Some(ns) = &deploy.ns {
            self.ns = Some(ns.clone());
        }
        if let Some(name) = &deploy.name {
            self.name = Some(name.clone());
        }
        for (key, value) in &deploy.attributes {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Merge introspection results; they take precedence over any override.
    pub fn apply_module(&mut self, info: ModuleInfo) {
        self.kind = info.kind.into();
        self.ns = Some(info.ns);
        if let Some(name) = info.name {
            self.name = Some(name);
        }
    }
}

/// Build the complete metadata for one discovered file.
///
/// Order of precedence, lowest first: path-derived defaults, the deploy
/// override, then module introspection for `xqy` files.
pub async fn assemble_metadata(
    config: &ProjectConfig,
    path: PathBuf,
    deploy: Option<&DeployOverride>,
) -> ContentResult<FileMetadata> {
    let mut metadata = FileMetadata::new(config, path).verify_under_modules()?;

    if let Some(deploy) = deploy {
        metadata.apply_override(deploy);
    }

    if metadata.format.is_script() {
        if let Some(info) = introspect_module(&metadata.path).await? {
            metadata.apply_module(info);
        }
    }

    tracing::debug!(
        location = %metadata.location,
        kind = %metadata.kind,
        format = %metadata.format,
        "Classified package file"
    );

    Ok(metadata)
}

/// Join path components with `/` regardless of the host separator.
fn forward_slashes(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
