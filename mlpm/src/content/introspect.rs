//! XQuery module introspection.
//!
//! Library modules open with a `module namespace p = "uri";` declaration.
//! Main modules instead declare variables, functions or namespaces (or start a
//! FLWOR expression) before any module declaration. The scanner pulls one line
//! at a time and stops at the first line that settles the question, so large
//! files are never read past their prologue.
//!
//! The namespace URI further distinguishes REST API extensions:
//!
//! ```text
//! http://marklogic.com/rest-api/resource/<name>   -> resource endpoint
//! http://marklogic.com/rest-api/transform/<name>  -> transform
//! anything else                                   -> generic module
//! ```

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::error::{ContentError, ContentResult};

/// Namespace prefix of REST API resource extensions.
pub const RESOURCE_NS: &str = "http://marklogic.com/rest-api/resource/";

/// Namespace prefix of REST API transforms.
pub const TRANSFORM_NS: &str = "http://marklogic.com/rest-api/transform/";

/// Role of a library module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Generic library module.
    Module,
    /// REST API resource extension.
    Resource,
    /// REST API transform.
    Transform,
}

/// What introspection learned about a library module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module role.
    pub kind: ModuleKind,
    /// Declared namespace URI.
    pub ns: String,
    /// Resource or transform name; `None` for generic modules.
    pub name: Option<String>,
}

impl ModuleInfo {
    /// Classify a declared namespace URI.
    ///
    /// The resource prefix is checked first.
    ///
    /// ```
    /// use mlpm::content::{ModuleInfo, ModuleKind};
    ///
    /// let info = ModuleInfo::from_namespace("http://marklogic.com/rest-api/transform/upper");
    /// assert_eq!(info.kind, ModuleKind::Transform);
    /// assert_eq!(info.name.as_deref(), Some("upper"));
    /// ```
    pub fn from_namespace(ns: impl Into<String>) -> Self {
        let ns = ns.into();
        let (kind, name) = if let Some(name) = suffix_after(&ns, RESOURCE_NS) {
            (ModuleKind::Resource, Some(name))
        } else if let Some(name) = suffix_after(&ns, TRANSFORM_NS) {
            (ModuleKind::Transform, Some(name))
        } else {
            (ModuleKind::Module, None)
        };

        Self { kind, ns, name }
    }
}

fn suffix_after(ns: &str, prefix: &str) -> Option<String> {
    ns.find(prefix).map(|idx| ns[idx + prefix.len()..].to_string())
}

/// Introspect an XQuery file on disk.
///
/// Returns `Ok(None)` for main modules and for files that never declare a
/// module. The file handle is released before returning on every path.
pub async fn introspect_module(path: &Path) -> ContentResult<Option<ModuleInfo>> {
    let file = File::open(path)
        .await
        .map_err(|source| ContentError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

    scan_lines(path, BufReader::new(file)).await
}

/// Scan XQuery source line by line.
///
/// `path` is only used to label errors. The reader is dropped as soon as a
/// line classifies the source. Invalid UTF-8 is replaced rather than
/// rejected, so a stray Latin-1 byte in a comment does not stop the scan.
pub async fn scan_lines<R>(path: &Path, mut reader: R) -> ContentResult<Option<ModuleInfo>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| ContentError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        line_number += 1;

        if is_main_prologue(&line) {
            return Ok(None);
        }

        if module_start().is_match(&line) {
            let ns = module_declaration()
                .captures(&line)
                .and_then(|c| c.get(1))
                .ok_or_else(|| ContentError::ModuleDeclaration {
                    path: path.to_path_buf(),
                    line_number,
                    line: line.to_string(),
                })?;

            return Ok(Some(ModuleInfo::from_namespace(ns.as_str())));
        }
    }

    Ok(None)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// A declaration, `for` or `let` ahead of any module declaration marks a main
/// module.
fn is_main_prologue(line: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^[\s\x{FEFF}]*(?:declare|for\s|let\s)")
                .expect("prologue pattern is valid")
        })
        .is_match(line)
}

fn module_start() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\s\x{FEFF}]*module").expect("module pattern is valid"))
}

/// `module namespace <prefix> = "<uri>";`, capturing the URI.
fn module_declaration() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^[\s\x{FEFF}]*module\s+namespace\s+[^\s=]+\s*=\s*"(.+)";\s*$"#)
            .expect("module declaration pattern is valid")
    })
}
