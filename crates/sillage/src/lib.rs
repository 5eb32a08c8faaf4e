//! # sillage
//!
//! Sillage - Incremental change-impact analysis for multi-file script and
//! SFC-style component projects.
//!
//! ## Name Origin
//!
//! **Sillage** (/si.jaʒ/) is the French word for the wake a ship leaves on
//! the water, the trail that keeps spreading long after the hull has
//! passed. A source change behaves the same way: it ripples outward
//! through everything that imports it. This crate traces that wake.
//!
//! ## What it does
//!
//! Given a project of scripts and composite documents (SFC-style files
//! bundling script, markup and style), sillage maintains a per-declaration
//! dependency snapshot and, for a list of changed files, reports which
//! exported declarations in which downstream files are actually affected,
//! at the granularity of individual declarations, not whole files.
//!
//! The source-language front-end is pluggable (see
//! [`sillage_croquis::Frontend`]); this crate supplies the project
//! configuration loading, file traversal and run orchestration around the
//! [`sillage_croquis`] engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sillage::{run, RunOptions};
//!
//! // full pass: build and persist the project snapshot
//! let outcome = run(&frontend, &RunOptions::new("/path/to/project"))?;
//!
//! // incremental pass: trace the impact of two modified files
//! let options = RunOptions::new("/path/to/project")
//!     .incremental(vec![
//!         "/path/to/project/src/utils/tree.ts".into(),
//!         "/path/to/project/src/api/role/index.ts".into(),
//!     ])
//!     .with_parallel(true);
//! let outcome = run(&frontend, &options)?;
//! for effect in outcome.report.unwrap_or_default() {
//!     println!("{} -> {} chains", effect.path, effect.effect_paths.len());
//! }
//! ```

pub mod project;
pub mod run;

pub use project::{load_project, Project, ProjectError, TraverseOptions};
pub use run::{run, ArtifactOptions, RunError, RunOptions, RunOutcome};

// Re-export the engine and toolbox crates
pub use sillage_carton as carton;
pub use sillage_croquis as croquis;

// Common engine types at the facade root
pub use sillage_croquis::{
    Declaration, DeclarationKind, EffectPath, EffectResult, FileRecord, FileType, Frontend,
    FrontendError, ImpactReport, Snapshot,
};
