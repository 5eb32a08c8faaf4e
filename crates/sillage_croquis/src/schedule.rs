//! Parallel analysis scheduler.
//!
//! Fans a file list out across a bounded pool of worker threads, each
//! invoking the front-end, and merges the per-worker batches into one
//! path-keyed [`Snapshot`]. Dispatch is pull-based: workers take the next
//! unprocessed index from a shared cursor, so uneven per-file analysis cost
//! balances itself. Sequential and parallel execution produce identical
//! snapshots; the mode only affects wall-clock time.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use sillage_carton::FxHashSet;
use tracing::{debug, warn};

use crate::frontend::Frontend;
use crate::record::{FileRecord, Snapshot};
use crate::resolve::CompilerOptions;

/// Worker count for `file_count` files: half the available cores, at least
/// one, never more workers than files.
pub fn default_worker_count(file_count: usize) -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    (cpus / 2).max(1).min(file_count.max(1))
}

/// Analyze `files` into a snapshot covering exactly those files.
///
/// `parallel` selects the worker pool; the result is identical either way.
pub fn analyze_files<F: Frontend>(
    frontend: &F,
    files: &[String],
    options: &CompilerOptions,
    installed: &[String],
    parallel: bool,
) -> Snapshot {
    let workers = if parallel {
        default_worker_count(files.len())
    } else {
        1
    };
    analyze_files_with_workers(frontend, files, options, installed, workers)
}

/// Analyze `files` with an explicit worker count (1 = sequential on the
/// calling thread). Exposed so mode-equivalence can be tested across
/// worker counts.
pub fn analyze_files_with_workers<F: Frontend>(
    frontend: &F,
    files: &[String],
    options: &CompilerOptions,
    installed: &[String],
    workers: usize,
) -> Snapshot {
    let files = dedup_preserving_order(files);
    let workers = workers.max(1).min(files.len().max(1));
    debug!(files = files.len(), workers, "scheduling analysis");

    if workers <= 1 {
        let records: Vec<FileRecord> = files
            .iter()
            .map(|path| analyze_one(frontend, path, options, installed))
            .collect();
        return finish(records, files.len());
    }

    let cursor = AtomicUsize::new(0);
    let merged: Mutex<Vec<FileRecord>> = Mutex::new(Vec::with_capacity(files.len()));

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let cursor = &cursor;
                let merged = &merged;
                let files = &files;
                s.spawn(move || {
                    // Each worker owns a disjoint batch; the shared state is
                    // only touched to pull an index and to hand the batch over.
                    let mut batch: Vec<FileRecord> = Vec::new();
                    loop {
                        let index = cursor.fetch_add(1, Ordering::Relaxed);
                        if index >= files.len() {
                            break;
                        }
                        batch.push(analyze_one(frontend, &files[index], options, installed));
                    }
                    let mut results = merged.lock().expect("result mutex poisoned");
                    results.extend(batch);
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("analysis worker panicked");
        }
    });

    let records = merged.into_inner().expect("result mutex poisoned");
    finish(records, files.len())
}

fn finish(records: Vec<FileRecord>, requested: usize) -> Snapshot {
    // complete exactly when every dispatched file produced a record
    debug_assert_eq!(records.len(), requested);
    records.into_iter().collect()
}

/// Analyze a single file, degrading failures instead of propagating them:
/// a missing file becomes a `not_exist` record, a front-end failure an
/// empty record of the classified file type.
fn analyze_one<F: Frontend>(
    frontend: &F,
    path: &str,
    options: &CompilerOptions,
    installed: &[String],
) -> FileRecord {
    if !Path::new(path).is_file() {
        return FileRecord::missing(path);
    }

    match frontend.analyze(Path::new(path), options, installed) {
        Ok(mut record) => {
            // derived state is never front-end authored
            record.parent_modules.clear();
            record
        }
        Err(error) => {
            warn!(path, %error, "front-end failed, degrading to empty record");
            FileRecord::degraded(path)
        }
    }
}

fn dedup_preserving_order(files: &[String]) -> Vec<String> {
    let mut seen = FxHashSet::default();
    files
        .iter()
        .filter(|path| seen.insert(path.as_str()))
        .cloned()
        .collect()
}
