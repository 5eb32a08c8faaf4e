//! Small filesystem helpers shared across the workspace.

use std::io;
use std::path::Path;

/// Read a file to a string.
pub fn read_to_string(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_string(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)
}

/// Whether `path` names an existing regular file.
#[inline]
pub fn is_file(path: &Path) -> bool {
    path.is_file()
}
