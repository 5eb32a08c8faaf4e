//! Dependency graph builder.
//!
//! `parent_modules` is derived state: the incoming edges of every record,
//! recomputed from the closure of outgoing `module_specifiers` over the
//! current snapshot. Rebuilding is a full pass, rerun whenever any subset
//! of records changes: a record analyzed before its import target entered
//! the snapshot would otherwise hold stale back-references.

use crate::record::Snapshot;

impl Snapshot {
    /// Recompute every record's `parent_modules` from scratch.
    ///
    /// For every file F and specifier S in `F.module_specifiers`, if S names
    /// a file in this snapshot, F becomes one of S's parents. Set semantics;
    /// specifiers pointing outside the snapshot (bare modules, unresolved
    /// paths) contribute nothing.
    pub fn rebuild_parent_links(&mut self) {
        let mut edges: Vec<(String, String)> = Vec::new();
        for (path, record) in self.iter() {
            for specifier in &record.module_specifiers {
                if self.contains(specifier) {
                    edges.push((specifier.clone(), path.clone()));
                }
            }
        }

        for (_, record) in self.iter_mut() {
            record.parent_modules.clear();
        }
        for (target, parent) in edges {
            if let Some(record) = self.get_mut(&target) {
                record.parent_modules.insert(parent);
            }
        }
    }
}
