//! Run orchestration.
//!
//! A run is either full (traverse the project, analyze everything, persist
//! the snapshot) or incremental (analyze only the modified files, merge
//! into the prior snapshot, persist snapshot + impact report). Per-file
//! analysis failures never abort a run; persistence failures are attached
//! to the outcome rather than voiding the in-memory result.

use std::path::{Path, PathBuf};

use sillage_carton::paths::to_slash_string;
use sillage_croquis::persist::{load_snapshot, save_report, save_snapshot, PersistError};
use sillage_croquis::{
    analyze_files, merge_incremental, Frontend, ImpactReport, IncrementalOutcome, Snapshot,
};
use thiserror::Error;
use tracing::{error, info};

use crate::project::{load_project, Project, ProjectError, TraverseOptions};

/// Fatal run failures: configuration could not be loaded, or the prior
/// snapshot an incremental run depends on could not be read.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Where one persisted artifact lives: a file name under the project root,
/// or under an explicit directory.
#[derive(Debug, Clone)]
pub struct ArtifactOptions {
    pub file_name: String,
    pub dir: Option<PathBuf>,
}

impl ArtifactOptions {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            dir: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    fn path_under(&self, root: &Path) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| root.to_path_buf())
            .join(&self.file_name)
    }
}

/// Parameters of one analysis run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub project_root: PathBuf,
    pub tsconfig_file_name: String,
    pub traverse: TraverseOptions,
    pub snapshot_file: ArtifactOptions,
    pub report_file: ArtifactOptions,
    /// Only consulted by incremental runs, filtered to analyzable
    /// extensions before use.
    pub modified_files: Vec<String>,
    pub full: bool,
    pub parallel: bool,
}

impl RunOptions {
    /// Full analysis of the project under `root`, sequential scheduling,
    /// default artifact names.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: root.into(),
            tsconfig_file_name: "tsconfig.json".into(),
            traverse: TraverseOptions::default(),
            snapshot_file: ArtifactOptions::new("analyze.json"),
            report_file: ArtifactOptions::new("result.json"),
            modified_files: Vec::new(),
            full: true,
            parallel: false,
        }
    }

    /// Switch to an incremental run over `modified` files.
    pub fn incremental(mut self, modified: Vec<String>) -> Self {
        self.modified_files = modified;
        self.full = false;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_traverse(mut self, traverse: TraverseOptions) -> Self {
        self.traverse = traverse;
        self
    }

    pub fn with_tsconfig_file_name(mut self, name: impl Into<String>) -> Self {
        self.tsconfig_file_name = name.into();
        self
    }

    pub fn with_snapshot_file(mut self, artifact: ArtifactOptions) -> Self {
        self.snapshot_file = artifact;
        self
    }

    pub fn with_report_file(mut self, artifact: ArtifactOptions) -> Self {
        self.report_file = artifact;
        self
    }
}

/// What a run produced. Always complete, even when individual files
/// degraded or an artifact failed to persist.
#[derive(Debug)]
pub struct RunOutcome {
    pub snapshot: Snapshot,
    /// Present for incremental runs only.
    pub report: Option<ImpactReport>,
    /// First persistence failure, if any; the in-memory artifacts above
    /// are still valid.
    pub persist_error: Option<PersistError>,
}

/// Execute a run with the given front-end.
pub fn run<F: Frontend>(frontend: &F, options: &RunOptions) -> Result<RunOutcome, RunError> {
    let project = load_project(
        &options.project_root,
        &options.tsconfig_file_name,
        &options.traverse,
        options.full,
    )?;

    if options.full {
        run_full(frontend, &project, options)
    } else {
        run_incremental(frontend, &project, options)
    }
}

fn run_full<F: Frontend>(
    frontend: &F,
    project: &Project,
    options: &RunOptions,
) -> Result<RunOutcome, RunError> {
    info!(files = project.files.len(), "full analysis");
    let mut snapshot = analyze_files(
        frontend,
        &project.files,
        &project.compiler_options,
        &project.installed_dependencies,
        options.parallel,
    );
    snapshot.rebuild_parent_links();

    let persist_error = persist(
        &options.snapshot_file.path_under(&project.root),
        &snapshot,
        save_snapshot,
    );
    Ok(RunOutcome {
        snapshot,
        report: None,
        persist_error,
    })
}

fn run_incremental<F: Frontend>(
    frontend: &F,
    project: &Project,
    options: &RunOptions,
) -> Result<RunOutcome, RunError> {
    let modified: Vec<String> = options
        .modified_files
        .iter()
        .filter(|file| options.traverse.matches(file))
        .map(|file| to_slash_string(Path::new(file)))
        .collect();

    if modified.is_empty() {
        info!("no analyzable modified files, nothing to do");
        return Ok(RunOutcome {
            snapshot: Snapshot::new(),
            report: Some(ImpactReport::new()),
            persist_error: None,
        });
    }

    let snapshot_path = options.snapshot_file.path_under(&project.root);
    let prior = load_snapshot(&snapshot_path)?;

    info!(files = modified.len(), "incremental analysis");
    let fresh = analyze_files(
        frontend,
        &modified,
        &project.compiler_options,
        &project.installed_dependencies,
        options.parallel,
    );

    let IncrementalOutcome { snapshot, report } = merge_incremental(prior, &fresh, &modified);

    let mut persist_error = persist(&snapshot_path, &snapshot, save_snapshot);
    let report_error = persist(
        &options.report_file.path_under(&project.root),
        &report,
        save_report,
    );
    persist_error = persist_error.or(report_error);

    Ok(RunOutcome {
        snapshot,
        report: Some(report),
        persist_error,
    })
}

fn persist<T>(
    path: &Path,
    value: &T,
    save: fn(&Path, &T) -> Result<(), PersistError>,
) -> Option<PersistError> {
    match save(path, value) {
        Ok(()) => None,
        Err(err) => {
            error!(%err, "failed to persist artifact");
            Some(err)
        }
    }
}
