//! Path normalization and cache keys.
//!
//! Paths are `/`-separated strings rather than `PathBuf`s: the storage behind
//! the cache is usually a virtual workspace, not the host filesystem.

use std::fmt;

/// Normalized absolute path identifying one cache entry.
///
/// Two keys compare equal when they name the same entry for the owning
/// cache, so a case-insensitive cache folds case into the key while
/// [`CacheKey::path`] keeps the spelling that goes to storage.
#[derive(Debug, Clone)]
pub struct CacheKey {
    path: String,
    folded: Option<String>,
}

impl CacheKey {
    pub fn new(path: &str, case_sensitive: bool) -> Self {
        let path = normalize(&uri_to_path(path));
        let folded = (!case_sensitive).then(|| path.to_lowercase());
        Self { path, folded }
    }

    /// The normalized path as handed to storage.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn identity(&self) -> &str {
        self.folded.as_deref().unwrap_or(&self.path)
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for CacheKey {}

impl std::hash::Hash for CacheKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Whether `path` is already rooted (`/x`, `C:/x` or a `file://` URI).
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.starts_with("file://") || has_drive_prefix(path)
}

/// Join `path` onto `root` unless it is already absolute.
pub fn resolve(root: &str, path: &str) -> String {
    if is_absolute(path) {
        normalize(&uri_to_path(path))
    } else {
        normalize(&format!("{}/{}", uri_to_path(root), path))
    }
}

/// Strip `root` from `path`, returning the remainder without a leading `/`.
///
/// Falls back to the full path when it does not live under `root`.
pub fn relative_to<'a>(root: &str, path: &'a str) -> &'a str {
    let root = root.trim_end_matches('/');
    match path.strip_prefix(root) {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => path,
    }
}

/// Lexically normalize a `/`-separated path.
///
/// Collapses repeated separators, drops `.` segments and trailing
/// separators, and resolves `..` against the preceding segment. `..` never
/// climbs above the root.
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let (prefix, rest) = if has_drive_prefix(&path) {
        path.split_at(2)
    } else {
        ("", path.as_str())
    };
    let rooted = rest.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut out = String::with_capacity(path.len());
    out.push_str(prefix);
    if rooted {
        out.push('/');
    }
    out.push_str(&segments.join("/"));
    if out.is_empty() {
        out.push('.');
    }
    out
}

/// Extract the path from a `file://` URI; other strings pass through.
///
/// `file:///C:/x` keeps its drive letter, `file:///x` keeps its leading `/`,
/// and a URI with an authority becomes a `//host/...` path.
pub fn uri_to_path(uri: &str) -> String {
    let path = if let Some(stripped) = uri.strip_prefix("file:///") {
        if has_drive_prefix(stripped) {
            stripped.to_string()
        } else {
            format!("/{}", stripped)
        }
    } else if let Some(stripped) = uri.strip_prefix("file://") {
        // `file://host/share/x` names a path on `host`; keep it rooted.
        match stripped.split_once('/') {
            Some(("localhost", rest)) => format!("/{rest}"),
            _ => format!("//{stripped}"),
        }
    } else {
        return uri.to_string();
    };
    percent_encoding::percent_decode_str(&path)
        .decode_utf8_lossy()
        .into_owned()
}

/// `C:/` or `C:\`; a bare `a:b` is a relative name.
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'/' | b'\\')
}
