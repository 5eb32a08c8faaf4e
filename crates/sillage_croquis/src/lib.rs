//! # sillage_croquis
//!
//! Croquis - The change-impact analysis engine for Sillage.
//!
//! ## Name Origin
//!
//! **Croquis** (/kʁɔ.ki/) is a French term for a quick, sketchy drawing
//! that captures the essential features of a subject. This crate sketches
//! what a source change touches: not a full semantic model of the project,
//! just the import/export skeleton needed to trace impact from a changed
//! declaration to everything downstream of it.
//!
//! ## Purpose
//!
//! Given per-file analysis records produced by a front-end, this crate:
//!
//! - **Schedules** analysis of a file list across a bounded worker pool
//! - **Builds** the bidirectional dependency graph (derived parent edges)
//! - **Diffs** a file's previous and current declaration sets
//! - **Propagates** a change through the parent graph at declaration
//!   granularity, producing impact chains
//! - **Merges** incremental results into the persisted snapshot
//!
//! ## Architecture
//!
//! ```text
//! front-end (external)
//!        ↓ FileRecord
//!  schedule (worker pool)
//!        ↓ Snapshot
//!   graph (parent edges) → diff (per changed file) → effect (DFS)
//!        ↓
//!   merge → persisted snapshot + impact report
//! ```

mod diff;
mod effect;
mod frontend;
mod graph;
mod merge;
mod record;
mod resolve;
mod schedule;

pub mod persist;
pub mod testing;

// Re-export core types
pub use diff::{diff_records, DiffEntry, DiffKind};
pub use effect::propagate;
pub use frontend::{Frontend, FrontendError};
pub use merge::{merge_incremental, IncrementalOutcome};
pub use record::{
    Declaration, DeclarationKind, EffectPath, EffectResult, FileRecord, FileType, ImpactReport,
    Snapshot,
};
pub use resolve::{resolve_module_specifier, CompilerOptions};
pub use schedule::{analyze_files, analyze_files_with_workers, default_worker_count};
