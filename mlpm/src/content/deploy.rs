//! Deploy config normalization.
//!
//! Authors can attach deployment overrides to package files in `mlpm.json`
//! using either of two shapes:
//!
//! ```text
//! "deploy": [ { "file": "lib/search.xqy", "type": "resource", ... }, ... ]
//! "deploy": { "lib/search.xqy": "resource", "lib/util.xqy": { "type": "module" } }
//! ```
//!
//! Both are resolved once, at this boundary, into [`DeployOverride`] records
//! keyed by the absolute path of the file they apply to.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::{normalize_lexically, ProjectConfig};

use super::error::{ContentError, ContentResult};
use super::format::Format;
use super::metadata::FileType;

/// The accepted shapes of a descriptor's `deploy` field.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployConfig {
    /// A list of objects, each naming its target in a `file` attribute.
    List(Vec<Map<String, Value>>),
    /// A map from file path to a type shorthand or an attribute object.
    Map(Map<String, Value>),
}

impl DeployConfig {
    /// Recognize the shape of a raw `deploy` value.
    ///
    /// Anything other than a list of objects or an object is rejected.
    pub fn from_value(value: &Value) -> ContentResult<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(entry) => Ok(entry.clone()),
                    other => Err(ContentError::InvalidDeployConfig(format!(
                        "entry {} of the deploy list must be an object, found {}",
                        index,
                        json_kind(other)
                    ))),
                })
                .collect::<ContentResult<Vec<_>>>()
                .map(Self::List),
            Value::Object(map) => Ok(Self::Map(map.clone())),
            other => Err(ContentError::InvalidDeployConfig(format!(
                "expected a list of objects or a map, found {}",
                json_kind(other)
            ))),
        }
    }
}

/// Override attributes for one package file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployOverride {
    /// Absolute path of the file this override applies to.
    pub path: PathBuf,
    /// Explicit `type`.
    pub kind: Option<FileType>,
    /// Explicit `format`.
    pub format: Option<Format>,
    /// Explicit `location`.
    pub location: Option<String>,
    /// Explicit `ns`.
    pub ns: Option<String>,
    /// Explicit `name`.
    pub name: Option<String>,
    /// Every other attribute, passed through untouched.
    pub attributes: Map<String, Value>,
}

impl DeployOverride {
    /// An empty override for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Build an override from an attribute object.
    ///
    /// Known keys are typed; `path` and `relativePath` are ignored since they
    /// identify the file rather than describe it.
    pub fn from_attributes(path: PathBuf, attributes: Map<String, Value>) -> ContentResult<Self> {
        let mut deploy = Self::new(path);

        for (key, value) in attributes {
            match key.as_str() {
                "type" => {
                    deploy.kind = Some(parse_kind(expect_str(&deploy.path, &key, &value)?)?);
                }
                "format" => {
                    let tag = expect_str(&deploy.path, &key, &value)?;
                    deploy.format = Some(Format::from_tag(tag));
                }
                "location" => {
                    let location = expect_str(&deploy.path, &key, &value)?;
                    deploy.location = Some(location.to_string());
                }
                "ns" => {
                    let ns = expect_str(&deploy.path, &key, &value)?;
                    deploy.ns = Some(ns.to_string());
                }
                "name" => {
                    let name = expect_str(&deploy.path, &key, &value)?;
                    deploy.name = Some(name.to_string());
                }
                "path" | "relativePath" => {}
                _ => {
                    deploy.attributes.insert(key, value);
                }
            }
        }

        Ok(deploy)
    }
}

/// Normalize a package's raw `deploy` value into overrides keyed by absolute
/// file path.
///
/// Relative paths resolve against the package's install directory. When the
/// same file is named twice the later entry wins.
pub fn normalize_deploy(
    config: &ProjectConfig,
    package: &str,
    deploy: &Value,
) -> ContentResult<HashMap<PathBuf, DeployOverride>> {
    let package_dir = config.package_dir(package);
    let mut overrides = HashMap::new();

    match DeployConfig::from_value(deploy)? {
        DeployConfig::List(entries) => {
            for (index, entry) in entries.into_iter().enumerate() {
                let file = match entry.get("file") {
                    Some(Value::String(file)) => file.clone(),
                    _ => {
                        return Err(ContentError::InvalidDeployConfig(format!(
                            "entry {} of the deploy list has no 'file' string",
                            index
                        )))
                    }
                };
                let path = resolve(&package_dir, &file);
                let deploy = DeployOverride::from_attributes(path.clone(), entry)?;
                overrides.insert(path, deploy);
            }
        }
        DeployConfig::Map(entries) => {
            for (file, value) in entries {
                let path = resolve(&package_dir, &file);
                let deploy = match value {
                    Value::String(kind) => DeployOverride {
                        kind: Some(parse_kind(&kind)?),
                        ..DeployOverride::new(path.clone())
                    },
                    Value::Object(attributes) => {
                        DeployOverride::from_attributes(path.clone(), attributes)?
                    }
                    other => {
                        return Err(ContentError::InvalidDeployConfig(format!(
                            "deploy entry for '{}' must be a type string or an object, found {}",
                            file,
                            json_kind(&other)
                        )))
                    }
                };
                overrides.insert(path, deploy);
            }
        }
    }

    tracing::debug!(package, overrides = overrides.len(), "Normalized deploy config");
    Ok(overrides)
}

/// Resolve `file` against `base`, folding `.` and `..` without touching the
/// filesystem.
fn resolve(base: &Path, file: &str) -> PathBuf {
    normalize_lexically(&base.join(file))
}

fn parse_kind(kind: &str) -> ContentResult<FileType> {
    kind.parse().map_err(ContentError::InvalidDeployConfig)
}

fn expect_str<'a>(path: &Path, key: &str, value: &'a Value) -> ContentResult<&'a str> {
    value.as_str().ok_or_else(|| {
        ContentError::InvalidDeployConfig(format!(
            "'{}' for {} must be a string, found {}",
            key,
            path.display(),
            json_kind(value)
        ))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn config() -> ProjectConfig {
        ProjectConfig::new("/srv/app")
    }

    fn pkg_path(relative: &str) -> PathBuf {
        PathBuf::from("/srv/app/mlpm_modules/search-ext").join(relative)
    }

    #[test]
    fn test_list_form() {
        let deploy = json!([
            { "file": "lib/a.xqy", "type": "resource", "foo": 1 },
            { "file": "./lib/b.xqy", "format": "xqy" }
        ]);

        let overrides = normalize_deploy(&config(), "search-ext", &deploy).unwrap();

        assert_eq!(overrides.len(), 2);
        let a = &overrides[&pkg_path("lib/a.xqy")];
        assert_eq!(a.path, pkg_path("lib/a.xqy"));
        assert_eq!(a.kind, Some(FileType::Resource));
        assert_eq!(a.attributes.get("foo"), Some(&json!(1)));
        assert_eq!(a.attributes.get("file"), Some(&json!("lib/a.xqy")));

        let b = &overrides[&pkg_path("lib/b.xqy")];
        assert_eq!(b.format, Some(Format::Script));
        assert_eq!(b.kind, None);
    }

    #[test]
    fn test_map_form() {
        let deploy = json!({
            "lib/a.xqy": "transform",
            "lib/../b.xqy": { "type": "module", "permissions": ["read"] }
        });

        let overrides = normalize_deploy(&config(), "search-ext", &deploy).unwrap();

        let a = &overrides[&pkg_path("lib/a.xqy")];
        assert_eq!(a.kind, Some(FileType::Transform));
        assert!(a.attributes.is_empty());

        let b = &overrides[&pkg_path("b.xqy")];
        assert_eq!(b.kind, Some(FileType::Module));
        assert_eq!(b.attributes.get("permissions"), Some(&json!(["read"])));
    }

    #[test]
    fn test_identity_keys_are_ignored() {
        let deploy = json!({ "a.xqy": { "path": "/tmp/evil", "relativePath": "x" } });

        let overrides = normalize_deploy(&config(), "search-ext", &deploy).unwrap();

        let a = &overrides[&pkg_path("a.xqy")];
        assert_eq!(a.path, pkg_path("a.xqy"));
        assert!(a.attributes.is_empty());
    }

    #[test]
    fn test_list_of_strings_is_rejected() {
        let deploy = json!(["lib/a.xqy", "lib/b.xqy"]);

        let err = normalize_deploy(&config(), "search-ext", &deploy).unwrap_err();

        assert!(matches!(err, ContentError::InvalidDeployConfig(_)));
        assert!(err.to_string().contains("must be an object"));
    }

    #[test]
    fn test_scalar_is_rejected() {
        for deploy in [json!("lib/a.xqy"), json!(42), json!(true)] {
            let result = normalize_deploy(&config(), "search-ext", &deploy);
            assert!(matches!(result, Err(ContentError::InvalidDeployConfig(_))));
        }
    }

    #[test]
    fn test_list_entry_without_file_is_rejected() {
        let deploy = json!([{ "type": "resource" }]);

        let err = normalize_deploy(&config(), "search-ext", &deploy).unwrap_err();

        assert!(err.to_string().contains("no 'file' string"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let deploy = json!({ "a.xqy": "endpoint" });

        let err = normalize_deploy(&config(), "search-ext", &deploy).unwrap_err();

        assert!(err.to_string().contains("unknown file type 'endpoint'"));
    }

    #[test]
    fn test_map_value_must_be_string_or_object() {
        let deploy = json!({ "a.xqy": 3 });

        let err = normalize_deploy(&config(), "search-ext", &deploy).unwrap_err();

        assert!(err.to_string().contains("found a number"));
    }

    #[test]
    fn test_non_string_known_attribute_is_rejected() {
        let deploy = json!({ "a.xqy": { "location": 7 } });

        let err = normalize_deploy(&config(), "search-ext", &deploy).unwrap_err();

        assert!(err.to_string().contains("'location'"));
    }

    #[test]
    fn test_later_entry_wins() {
        let deploy = json!([
            { "file": "a.xqy", "type": "module" },
            { "file": "./a.xqy", "type": "resource" }
        ]);

        let overrides = normalize_deploy(&config(), "search-ext", &deploy).unwrap();

        assert_eq!(overrides.len(), 1);
        assert_eq!(
            overrides[&pkg_path("a.xqy")].kind,
            Some(FileType::Resource)
        );
    }

    #[test]
    fn test_empty_list_is_accepted() {
        let overrides = normalize_deploy(&config(), "search-ext", &json!([])).unwrap();
        assert!(overrides.is_empty());
    }
}
