//! Lexical path resolution.
//!
//! Module specifier resolution needs `path.resolve`-style joining that does
//! not require the target to exist, so `.` and `..` segments are folded
//! lexically instead of through `canonicalize`.

use std::path::{Component, Path, PathBuf};

/// Fold `.` and `..` segments of `path` without touching the filesystem.
///
/// A `..` at the root is dropped, matching how absolute paths resolve.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    // keep a leading ".." only for relative inputs
                    if !path.has_root() {
                        out.push("..");
                    }
                }
            }
            c => out.push(c.as_os_str()),
        }
    }
    out
}

/// Join `segment` onto `base` and normalize the result lexically.
pub fn resolve_from(base: &Path, segment: &str) -> PathBuf {
    let candidate = Path::new(segment);
    if candidate.is_absolute() {
        normalize_path(candidate)
    } else {
        normalize_path(&base.join(candidate))
    }
}

/// Render a path with forward slashes, the canonical form used as a
/// snapshot key on every platform.
pub fn to_slash_string(path: &Path) -> String {
    let s = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
