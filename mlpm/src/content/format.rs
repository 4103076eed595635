//! File format classification by extension.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Extensions that all denote XQuery source.
const SCRIPT_EXTENSIONS: &[&str] = &["xq", "xqy", "xql", "xqm"];

/// Coarse format tag of a package file.
///
/// Every XQuery extension collapses to [`Format::Script`] (`xqy`); a path
/// without an extension is [`Format::Text`] (`txt`); anything else keeps its
/// extension verbatim.
///
/// ```
/// use mlpm::content::Format;
///
/// assert_eq!(Format::from_path("lib/search.xqm"), Format::Script);
/// assert_eq!(Format::from_path("config/options.json").as_str(), "json");
/// assert_eq!(Format::from_path("LICENSE-NOTES").as_str(), "txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Format {
    /// XQuery source (`xqy`).
    Script,
    /// Plain text, or no extension at all (`txt`).
    Text,
    /// Any other extension.
    Other(String),
}

impl Format {
    /// Classify a path by its final extension.
    pub fn from_path(path: &str) -> Self {
        match extension_pattern().captures(path).and_then(|c| c.get(1)) {
            Some(ext) if SCRIPT_EXTENSIONS.contains(&ext.as_str()) => Self::Script,
            Some(ext) => Self::from_tag(ext.as_str()),
            None => Self::Text,
        }
    }

    /// Interpret a format tag, as found in a deploy override.
    ///
    /// Only the canonical `xqy` tag denotes a script; other XQuery extensions
    /// are kept as given.
    pub fn from_tag(tag: &str) -> Self {
        if tag == "xqy" {
            Self::Script
        } else if tag == "txt" {
            Self::Text
        } else {
            Self::Other(tag.to_string())
        }
    }

    /// The short tag for this format.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Script => "xqy",
            Self::Text => "txt",
            Self::Other(ext) => ext,
        }
    }

    /// Whether files of this format need module introspection.
    pub fn is_script(&self) -> bool {
        matches!(self, Self::Script)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Format {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// Everything after the first dot of the last path segment, up to the end.
///
/// The class excludes whitespace and `/`, so `a.b/c` has no extension while
/// `archive.tar.gz` yields `tar.gz`.
fn extension_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\.([^\s/]+)$").expect("extension pattern is valid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_extensions_collapse() {
        for path in ["a.xq", "a.xqy", "lib/a.xql", "/abs/mlpm_modules/p/a.xqm"] {
            assert_eq!(Format::from_path(path), Format::Script, "{path}");
            assert_eq!(Format::from_path(path).as_str(), "xqy");
        }
    }

    #[test]
    fn test_other_extension_passes_through() {
        assert_eq!(Format::from_path("foo.json"), Format::Other("json".into()));
        assert_eq!(Format::from_path("foo.json").as_str(), "json");
        assert_eq!(Format::from_path("style.CSS").as_str(), "CSS");
    }

    #[test]
    fn test_no_extension_is_text() {
        assert_eq!(Format::from_path("foo"), Format::Text);
        assert_eq!(Format::from_path("foo").as_str(), "txt");
        assert_eq!(Format::from_path("notes.txt"), Format::Text);
    }

    #[test]
    fn test_dot_in_directory_is_not_an_extension() {
        assert_eq!(Format::from_path("./mlpm_modules/pkg/Makefile"), Format::Text);
        assert_eq!(Format::from_path("v1.2/README"), Format::Text);
    }

    #[test]
    fn test_multi_dot_extension() {
        assert_eq!(Format::from_path("dist/bundle.tar.gz").as_str(), "tar.gz");
    }

    #[test]
    fn test_serializes_as_tag() {
        let json = serde_json::to_string(&Format::Script).unwrap();
        assert_eq!(json, "\"xqy\"");
        let back: Format = serde_json::from_str("\"xqy\"").unwrap();
        assert_eq!(back, Format::Script);
    }

    #[test]
    fn test_only_canonical_tag_is_script() {
        assert_eq!(Format::from_tag("xqy"), Format::Script);
        assert_eq!(Format::from_tag("xqm"), Format::Other("xqm".into()));
        assert_eq!(Format::from_tag("txt"), Format::Text);
    }
}
