//! Front-end contract.
//!
//! Parsing a source file into a [`FileRecord`] is the job of an external
//! front-end; the engine only defines the seam. Implementations must
//! uphold:
//!
//! - `path` echoes the requested path;
//! - declarations appear in encounter order;
//! - `module_specifiers` are resolved through
//!   [`crate::resolve::resolve_module_specifier`] (or equivalently
//!   canonical forms);
//! - `content_hash` is stable across runs for unchanged normalized syntax;
//! - `dependencies` name only declarations of the same file;
//! - `parent_modules` is left empty (derived state, rebuilt by the graph
//!   builder).

use std::path::Path;

use thiserror::Error;

use crate::record::FileRecord;
use crate::resolve::CompilerOptions;

/// A front-end could not produce a structured record for an existing file.
///
/// This is always a soft failure: the scheduler logs it and degrades the
/// file to an empty record instead of aborting the batch.
#[derive(Debug, Error)]
#[error("front-end failed on {path}: {message}")]
pub struct FrontendError {
    pub path: String,
    pub message: String,
}

impl FrontendError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Produces one [`FileRecord`] per source file.
///
/// `Sync` because the parallel scheduler shares one front-end across its
/// worker threads.
pub trait Frontend: Sync {
    fn analyze(
        &self,
        path: &Path,
        options: &CompilerOptions,
        installed: &[String],
    ) -> Result<FileRecord, FrontendError>;
}
