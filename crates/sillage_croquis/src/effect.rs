//! Impact propagation engine.
//!
//! Given a changed file's diff, walks the parent graph depth-first and
//! reports every chain of files the change can reach, carrying forward only
//! the declaration names that are both imported by a parent and provably
//! affected there. Composite documents propagate opaquely: they are
//! consumed as indivisible units, so every importing parent is considered
//! affected without name filtering.
//!
//! A chain is recorded only when a branch reaches a file with no parents
//! (a terminal ancestor). A file whose parents exist but none qualifies is
//! a dead end and contributes nothing: "nothing upstream is affected" is
//! different from "nothing is upstream".

use sillage_carton::FxHashSet;

use crate::diff::DiffEntry;
use crate::record::{EffectPath, EffectResult, FileRecord, FileType, Snapshot};

/// Compute the full downstream impact of one changed file.
///
/// `diffs` is the output of [`crate::diff::diff_records`] for that file;
/// the exported entries seed the relevant-name set. The walk itself uses
/// `snapshot` (the merged graph), never the records the diff was taken
/// against.
pub fn propagate(snapshot: &Snapshot, changed: &FileRecord, diffs: &[DiffEntry]) -> EffectResult {
    let seed: Vec<String> = diffs
        .iter()
        .filter(|entry| entry.declaration.is_exported)
        .map(|entry| entry.declaration.name.clone())
        .collect();

    let mut chains: Vec<Vec<String>> = Vec::new();
    let mut trail = vec![changed.path.clone()];
    walk(snapshot, &changed.path, &mut trail, &seed, &mut chains);

    EffectResult {
        path: changed.path.clone(),
        effect_paths: chains
            .into_iter()
            .map(|paths| EffectPath {
                name: paths.last().cloned().unwrap_or_default(),
                paths,
            })
            .collect(),
    }
}

fn walk(
    snapshot: &Snapshot,
    path: &str,
    trail: &mut Vec<String>,
    relevant: &[String],
    chains: &mut Vec<Vec<String>>,
) {
    let Some(record) = snapshot.get(path) else {
        chains.push(trail.clone());
        return;
    };

    if record.parent_modules.is_empty() {
        chains.push(trail.clone());
        return;
    }

    let opaque = record.file_type == FileType::CompositeDocument;

    for parent in &record.parent_modules {
        // cycle guard: never re-enter a file already on this branch
        if trail.iter().any(|visited| visited == parent) {
            continue;
        }
        let Some(parent_record) = snapshot.get(parent) else {
            continue;
        };

        let next_relevant = if opaque {
            Vec::new()
        } else {
            let common: FxHashSet<&str> = parent_record
                .declare_vars
                .iter()
                .filter(|decl| decl.is_imported && relevant.iter().any(|name| name == &decl.name))
                .map(|decl| decl.name.as_str())
                .collect();
            if common.is_empty() {
                continue;
            }

            let affected = affected_exports(parent_record, &common);
            if affected.is_empty() {
                continue;
            }
            affected
        };

        trail.push(parent.clone());
        walk(snapshot, parent, trail, &next_relevant, chains);
        trail.pop();
    }
}

/// Names of `record`'s exported declarations whose reflexive transitive
/// dependency closure touches one of the `common` imported names.
///
/// Reflexive: a re-exported import (`is_imported && is_exported`, empty
/// `dependencies`) whose own name is common is itself affected.
fn affected_exports(record: &FileRecord, common: &FxHashSet<&str>) -> Vec<String> {
    let by_name = record.declarations_by_name();
    let mut affected = Vec::new();

    for (name, decl) in &by_name {
        if !decl.is_exported {
            continue;
        }
        if common.contains(name) {
            affected.push((*name).to_string());
            continue;
        }

        let mut visited: FxHashSet<&str> = FxHashSet::default();
        visited.insert(*name);
        let mut stack: Vec<&str> = decl.dependencies.iter().map(String::as_str).collect();
        let mut touches = false;
        while let Some(dep_name) = stack.pop() {
            if !visited.insert(dep_name) {
                continue;
            }
            if common.contains(dep_name) {
                touches = true;
                break;
            }
            if let Some(dep) = by_name.get(dep_name) {
                stack.extend(dep.dependencies.iter().map(String::as_str));
            }
        }
        if touches {
            affected.push((*name).to_string());
        }
    }

    affected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{DiffEntry, DiffKind};
    use crate::record::{Declaration, DeclarationKind, FileRecord, FileType};

    fn changed(decl: Declaration) -> Vec<DiffEntry> {
        vec![DiffEntry {
            declaration: decl,
            kind: DiffKind::Change,
        }]
    }

    fn composite(path: &str, parents: &[&str]) -> FileRecord {
        let mut record = FileRecord::new(path, FileType::CompositeDocument);
        for parent in parents {
            record.parent_modules.insert((*parent).to_string());
        }
        record
    }

    #[test]
    fn test_zero_parents_yields_single_self_chain() {
        let record = FileRecord::new("/a.ts", FileType::Script);
        let snapshot: Snapshot = vec![record.clone()].into_iter().collect();
        let diffs = changed(Declaration::new("foo", DeclarationKind::Const).exported());
        let result = propagate(&snapshot, &record, &diffs);
        assert_eq!(result.effect_paths.len(), 1);
        assert_eq!(result.effect_paths[0].paths, vec!["/a.ts"]);
        assert_eq!(result.effect_paths[0].name, "/a.ts");
    }

    #[test]
    fn test_opaque_mutual_parent_cycle_scenario() {
        // a <- b,c; b <- c,d; c <- a,d,e,f; d <- a,e,f; e and f are roots
        let snapshot: Snapshot = vec![
            composite("a", &["b", "c"]),
            composite("b", &["c", "d"]),
            composite("c", &["a", "d", "e", "f"]),
            composite("d", &["a", "e", "f"]),
            composite("e", &[]),
            composite("f", &[]),
        ]
        .into_iter()
        .collect();

        let start = snapshot.get("a").unwrap().clone();
        let result = propagate(&snapshot, &start, &[]);

        let chains: Vec<Vec<String>> = result
            .effect_paths
            .iter()
            .map(|e| e.paths.clone())
            .collect();

        // every qualifying non-cyclic branch is visited, none revisits "a"
        assert_eq!(
            chains,
            vec![
                vec!["a", "b", "c", "d", "e"],
                vec!["a", "b", "c", "d", "f"],
                vec!["a", "b", "c", "e"],
                vec!["a", "b", "c", "f"],
                vec!["a", "b", "d", "e"],
                vec!["a", "b", "d", "f"],
                vec!["a", "c", "d", "e"],
                vec!["a", "c", "d", "f"],
                vec!["a", "c", "e"],
                vec!["a", "c", "f"],
            ]
            .into_iter()
            .map(|chain: Vec<&str>| chain.into_iter().map(String::from).collect::<Vec<_>>())
            .collect::<Vec<_>>()
        );

        for effect in &result.effect_paths {
            // chains terminate only at the parentless roots
            assert!(effect.name == "e" || effect.name == "f");
            assert_eq!(effect.name, *effect.paths.last().unwrap());
            // cycle safety: no path element repeats
            let mut unique: Vec<&String> = effect.paths.iter().collect();
            unique.dedup();
            assert_eq!(unique.len(), effect.paths.len());
        }

        // "d" is reached via both "b" and "c"
        let via = |from: &str| {
            chains
                .iter()
                .any(|c| c.windows(2).any(|w| w[0] == from && w[1] == "d"))
        };
        assert!(via("b"));
        assert!(via("c"));
    }

    #[test]
    fn test_named_propagation_through_reexporting_chain() {
        // a exports foo; b imports foo, exports bar depending on foo;
        // c imports bar, exports baz depending on bar; c has no parents
        let a = FileRecord::new("/a.ts", FileType::Script)
            .with_declaration(
                Declaration::new("foo", DeclarationKind::Function)
                    .exported()
                    .with_hash("f1"),
            );
        let b = FileRecord::new("/b.ts", FileType::Script)
            .with_specifier("/a.ts")
            .with_declaration(Declaration::new("foo", DeclarationKind::Const).imported("/a.ts"))
            .with_declaration(
                Declaration::new("bar", DeclarationKind::Function)
                    .exported()
                    .with_dependency("foo"),
            );
        let c = FileRecord::new("/c.ts", FileType::Script)
            .with_specifier("/b.ts")
            .with_declaration(Declaration::new("bar", DeclarationKind::Const).imported("/b.ts"))
            .with_declaration(
                Declaration::new("baz", DeclarationKind::Const)
                    .exported()
                    .with_dependency("bar"),
            );

        let mut snapshot: Snapshot = vec![a.clone(), b, c].into_iter().collect();
        snapshot.rebuild_parent_links();

        let diffs = changed(
            Declaration::new("foo", DeclarationKind::Function)
                .exported()
                .with_hash("f2"),
        );
        let result = propagate(&snapshot, &a, &diffs);
        assert_eq!(result.effect_paths.len(), 1);
        assert_eq!(result.effect_paths[0].paths, vec!["/a.ts", "/b.ts", "/c.ts"]);
        assert_eq!(result.effect_paths[0].name, "/c.ts");
    }

    #[test]
    fn test_importer_without_affected_export_does_not_propagate() {
        // d imports foo but no exported declaration of d references it
        let a = FileRecord::new("/a.ts", FileType::Script).with_declaration(
            Declaration::new("foo", DeclarationKind::Function)
                .exported()
                .with_hash("f1"),
        );
        let d = FileRecord::new("/d.ts", FileType::Script)
            .with_specifier("/a.ts")
            .with_declaration(Declaration::new("foo", DeclarationKind::Const).imported("/a.ts"))
            .with_declaration(Declaration::new("qux", DeclarationKind::Const).exported());

        let mut snapshot: Snapshot = vec![a.clone(), d].into_iter().collect();
        snapshot.rebuild_parent_links();

        let diffs = changed(
            Declaration::new("foo", DeclarationKind::Function)
                .exported()
                .with_hash("f2"),
        );
        let result = propagate(&snapshot, &a, &diffs);
        // parents exist but none qualifies: a dead end, not a terminal
        assert!(result.effect_paths.is_empty());
    }

    #[test]
    fn test_plain_reexport_is_affected_reflexively() {
        // b re-exports foo verbatim: is_imported && is_exported, no deps
        let a = FileRecord::new("/a.ts", FileType::Script).with_declaration(
            Declaration::new("foo", DeclarationKind::Function)
                .exported()
                .with_hash("f1"),
        );
        let mut reexport = Declaration::new("foo", DeclarationKind::Const).imported("/a.ts");
        reexport.is_exported = true;
        let b = FileRecord::new("/b.ts", FileType::Script)
            .with_specifier("/a.ts")
            .with_declaration(reexport);

        let mut snapshot: Snapshot = vec![a.clone(), b].into_iter().collect();
        snapshot.rebuild_parent_links();

        let diffs = changed(
            Declaration::new("foo", DeclarationKind::Function)
                .exported()
                .with_hash("f2"),
        );
        let result = propagate(&snapshot, &a, &diffs);
        assert_eq!(result.effect_paths.len(), 1);
        assert_eq!(result.effect_paths[0].paths, vec!["/a.ts", "/b.ts"]);
    }

    #[test]
    fn test_unexported_change_does_not_leave_the_file() {
        let a = FileRecord::new("/a.ts", FileType::Script)
            .with_declaration(Declaration::new("internal", DeclarationKind::Const).with_hash("1"));
        let b = FileRecord::new("/b.ts", FileType::Script)
            .with_specifier("/a.ts")
            .with_declaration(
                Declaration::new("internal", DeclarationKind::Const).imported("/a.ts"),
            )
            .with_declaration(
                Declaration::new("wrap", DeclarationKind::Const)
                    .exported()
                    .with_dependency("internal"),
            );
        let mut snapshot: Snapshot = vec![a.clone(), b].into_iter().collect();
        snapshot.rebuild_parent_links();

        // the changed declaration is not exported, so the seed is empty
        let diffs = changed(Declaration::new("internal", DeclarationKind::Const).with_hash("2"));
        let result = propagate(&snapshot, &a, &diffs);
        assert!(result.effect_paths.is_empty());
    }

    #[test]
    fn test_opaque_document_propagates_without_name_filtering() {
        // App.vue imports nothing relevant by name, but the changed .vue
        // file infects it anyway
        let widget = composite("/Widget.vue", &["/App.vue"]);
        let app = FileRecord::new("/App.vue", FileType::CompositeDocument)
            .with_specifier("/Widget.vue");
        let mut snapshot: Snapshot = vec![widget.clone(), app].into_iter().collect();
        snapshot.rebuild_parent_links();

        let result = propagate(&snapshot, snapshot.get("/Widget.vue").unwrap(), &[]);
        assert_eq!(result.effect_paths.len(), 1);
        assert_eq!(
            result.effect_paths[0].paths,
            vec!["/Widget.vue", "/App.vue"]
        );
    }

    #[test]
    fn test_transitive_dependency_closure() {
        // b: exported outer -> middle -> inner(imported foo)
        let a = FileRecord::new("/a.ts", FileType::Script).with_declaration(
            Declaration::new("foo", DeclarationKind::Function)
                .exported()
                .with_hash("f1"),
        );
        let b = FileRecord::new("/b.ts", FileType::Script)
            .with_specifier("/a.ts")
            .with_declaration(Declaration::new("foo", DeclarationKind::Const).imported("/a.ts"))
            .with_declaration(
                Declaration::new("inner", DeclarationKind::Const).with_dependency("foo"),
            )
            .with_declaration(
                Declaration::new("middle", DeclarationKind::Const).with_dependency("inner"),
            )
            .with_declaration(
                Declaration::new("outer", DeclarationKind::Function)
                    .exported()
                    .with_dependency("middle"),
            );
        let mut snapshot: Snapshot = vec![a.clone(), b].into_iter().collect();
        snapshot.rebuild_parent_links();

        let diffs = changed(
            Declaration::new("foo", DeclarationKind::Function)
                .exported()
                .with_hash("f2"),
        );
        let result = propagate(&snapshot, &a, &diffs);
        assert_eq!(result.effect_paths.len(), 1);
        assert_eq!(result.effect_paths[0].paths, vec!["/a.ts", "/b.ts"]);
    }

    #[test]
    fn test_two_node_import_cycle_terminates() {
        let mut a = FileRecord::new("/a.ts", FileType::Script)
            .with_specifier("/b.ts")
            .with_declaration(Declaration::new("fromB", DeclarationKind::Const).imported("/b.ts"))
            .with_declaration(
                Declaration::new("ay", DeclarationKind::Const)
                    .exported()
                    .with_hash("1")
                    .with_dependency("fromB"),
            );
        a.parent_modules.insert("/b.ts".to_string());
        let mut b = FileRecord::new("/b.ts", FileType::Script)
            .with_specifier("/a.ts")
            .with_declaration(Declaration::new("ay", DeclarationKind::Const).imported("/a.ts"))
            .with_declaration(
                Declaration::new("fromB", DeclarationKind::Const)
                    .exported()
                    .with_dependency("ay"),
            );
        b.parent_modules.insert("/a.ts".to_string());

        let snapshot: Snapshot = vec![a.clone(), b].into_iter().collect();
        let diffs = changed(
            Declaration::new("ay", DeclarationKind::Const)
                .exported()
                .with_hash("2"),
        );
        // b qualifies, but recursing back into a is stopped by the cycle
        // guard; b still has a parent, so nothing is recorded
        let result = propagate(&snapshot, &a, &diffs);
        assert!(result.effect_paths.is_empty());
    }
}
