//! Package descriptor (`mlpm.json`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::FileMetadata;

/// The descriptor shipped at the root of every package.
///
/// Only the fields this crate acts on are typed; everything else round-trips
/// through `extra`.
///
/// ```
/// use mlpm::package::PackageDescriptor;
///
/// let descriptor = PackageDescriptor::from_json(br#"{
///     "name": "search-ext",
///     "version": "1.2.0",
///     "deploy": { "lib/search.xqy": "resource" },
///     "author": "someone"
/// }"#).unwrap();
///
/// assert_eq!(descriptor.name, "search-ext");
/// assert_eq!(descriptor.version.as_deref(), Some("1.2.0"));
/// assert!(descriptor.deploy.is_some());
/// assert!(descriptor.extra.contains_key("author"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDescriptor {
    /// Package name; also the install directory name.
    pub name: String,

    /// Package version as written by the author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Raw deploy overrides, in list or map form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<Value>,

    /// Ordered, classified payload computed by the content pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepared_deploy: Option<Vec<FileMetadata>>,

    /// Any other descriptor fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageDescriptor {
    /// A descriptor with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            deploy: None,
            prepared_deploy: None,
            extra: Map::new(),
        }
    }

    /// Set the version (builder pattern).
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the raw deploy config (builder pattern).
    pub fn with_deploy(mut self, deploy: Value) -> Self {
        self.deploy = Some(deploy);
        self
    }

    /// Parse a descriptor from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_null_deploy_is_absent() {
        let descriptor = PackageDescriptor::from_json(br#"{"name":"p","deploy":null}"#).unwrap();
        assert_eq!(descriptor.deploy, None);
    }

    #[test]
    fn test_name_is_required() {
        assert!(PackageDescriptor::from_json(br#"{"version":"1.0.0"}"#).is_err());
    }

    #[test]
    fn test_builder() {
        let descriptor = PackageDescriptor::new("p")
            .with_version("0.1.0")
            .with_deploy(json!({"a.xqy": "module"}));

        assert_eq!(descriptor.version.as_deref(), Some("0.1.0"));
        assert_eq!(descriptor.deploy, Some(json!({"a.xqy": "module"})));
        assert_eq!(descriptor.prepared_deploy, None);
    }

    #[test]
    fn test_serializes_prepared_deploy_camel_case() {
        let mut descriptor = PackageDescriptor::new("p");
        descriptor.prepared_deploy = Some(Vec::new());

        let value = serde_json::to_value(&descriptor).unwrap();

        assert_eq!(value, json!({"name": "p", "preparedDeploy": []}));
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let source = json!({
            "name": "p",
            "description": "things",
            "dependencies": {"other": "^1.0.0"}
        });

        let descriptor: PackageDescriptor = serde_json::from_value(source.clone()).unwrap();

        assert_eq!(serde_json::to_value(&descriptor).unwrap(), source);
    }
}
