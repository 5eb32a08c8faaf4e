//! Declaration diff engine.
//!
//! Compares a file's previous and current declaration sets and classifies
//! each named declaration as added, changed, or removed. Names collide
//! last-declaration-wins within one side, matching the front-end's own
//! supersede rule; the keyed maps keep first-encounter order so output
//! ordering stays tied to declaration order.

use crate::record::{Declaration, FileRecord};

/// How a declaration differs between the old and new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Add,
    Change,
    Remove,
}

/// A declaration together with its classification. Transient: produced
/// once per incremental run and consumed by the propagation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    pub declaration: Declaration,
    pub kind: DiffKind,
}

/// Diff `old` against `new`.
///
/// Output order: add/change entries for names scanned in `new`'s
/// declaration order, then remove entries scanned in `old`'s order.
/// Unchanged names (equal fingerprints, with absent treated as empty)
/// produce no entry.
pub fn diff_records(old: &FileRecord, new: &FileRecord) -> Vec<DiffEntry> {
    let old_vars = old.declarations_by_name();
    let new_vars = new.declarations_by_name();

    let mut diffs = Vec::new();

    for (name, new_decl) in &new_vars {
        match old_vars.get(name) {
            None => diffs.push(DiffEntry {
                declaration: (*new_decl).clone(),
                kind: DiffKind::Add,
            }),
            Some(old_decl) => {
                if new_decl.hash_or_empty() != old_decl.hash_or_empty() {
                    diffs.push(DiffEntry {
                        declaration: (*new_decl).clone(),
                        kind: DiffKind::Change,
                    });
                }
            }
        }
    }

    for (name, old_decl) in &old_vars {
        if !new_vars.contains_key(name) {
            diffs.push(DiffEntry {
                declaration: (*old_decl).clone(),
                kind: DiffKind::Remove,
            });
        }
    }

    diffs
}
