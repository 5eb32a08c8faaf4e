//! Artifact persistence.
//!
//! Snapshots and impact reports serialize as pretty-printed JSON arrays,
//! records ordered by path, so artifacts are byte-stable regardless of
//! analysis completion order. A missing snapshot file is not an error: the
//! first incremental run of a project simply starts from an empty graph.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::record::{ImpactReport, Snapshot};

/// Writing or reading a persisted artifact failed. The in-memory result of
/// the run that produced the artifact is still valid.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load a snapshot, keying records by path (later duplicates win).
///
/// A missing file yields an empty snapshot.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, PersistError> {
    if !path.is_file() {
        info!(path = %path.display(), "no prior snapshot, starting empty");
        return Ok(Snapshot::new());
    }
    let content = sillage_carton::fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| PersistError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Persist a snapshot as a path-ordered JSON array.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), PersistError> {
    write_json(path, snapshot)
}

/// Persist an impact report, preserving the run's changed-file order.
pub fn save_report(path: &Path, report: &ImpactReport) -> Result<(), PersistError> {
    write_json(path, report)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| PersistError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    sillage_carton::fs::write_string(path, &json).map_err(|source| PersistError::Write {
        path: path.display().to_string(),
        source,
    })
}
