//! Incremental snapshot merge.
//!
//! Takes the persisted prior snapshot and a freshly analyzed subset (the
//! changed files only), replaces the changed records, rebuilds the derived
//! parent edges globally, and runs diff + propagation once per changed
//! file. "Old" declarations come from the prior snapshot; the graph walked
//! during propagation is the fully merged one.

use sillage_carton::{FxHashMap, FxHashSet};

use crate::diff::diff_records;
use crate::effect::propagate;
use crate::record::{FileRecord, ImpactReport, Snapshot};

/// The two persisted artifacts of an incremental run.
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementalOutcome {
    /// Merged snapshot: changed records replaced, `not_exist` files
    /// removed, parent edges rebuilt.
    pub snapshot: Snapshot,
    /// One effect result per surviving changed file, in input order.
    pub report: ImpactReport,
}

/// Merge `fresh` (covering exactly `changed_files`) into `prior` and
/// compute the impact of every change.
///
/// A file new to the snapshot diffs against itself, so its diff is empty;
/// a file observed as `not_exist` is removed and contributes no report
/// entry.
pub fn merge_incremental(
    prior: Snapshot,
    fresh: &Snapshot,
    changed_files: &[String],
) -> IncrementalOutcome {
    let mut seen = FxHashSet::default();
    let changed: Vec<&String> = changed_files
        .iter()
        .filter(|path| seen.insert(path.as_str()))
        .collect();

    // prior records of the changed files, kept for diffing
    let mut old_records: FxHashMap<String, FileRecord> = FxHashMap::default();
    for path in &changed {
        if let Some(old) = prior.get(path) {
            old_records.insert((*path).clone(), old.clone());
        }
    }

    let mut snapshot = prior;
    for path in &changed {
        let Some(new_record) = fresh.get(path) else {
            continue;
        };
        if new_record.not_exist {
            snapshot.remove(path);
        } else {
            snapshot.insert(new_record.clone());
        }
    }

    snapshot.rebuild_parent_links();

    let mut report = ImpactReport::new();
    for path in &changed {
        let Some(merged_record) = snapshot.get(path) else {
            continue; // removed or never produced
        };
        let old = old_records.get(path.as_str()).unwrap_or(merged_record);
        let diffs = diff_records(old, merged_record);
        report.push(propagate(&snapshot, merged_record, &diffs));
    }

    IncrementalOutcome { snapshot, report }
}
