//! Per-file analysis records and the snapshot they live in.
//!
//! A [`FileRecord`] is the unit of input the graph engine consumes: one
//! analyzed file with its top-level declarations and outgoing module edges.
//! Records are produced by a front-end (see [`crate::frontend`]), collected
//! into a path-keyed [`Snapshot`], and replaced wholesale whenever a file is
//! re-analyzed. `parent_modules` is derived state, recomputed from the full
//! snapshot; it is never authored by a front-end.

use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use sillage_carton::FxHashMap;

/// Kind of a top-level named binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Function,
    Class,
    Const,
    Let,
    Var,
    Interface,
    #[serde(rename = "type")]
    TypeAlias,
    Enum,
}

/// One top-level named binding in a file.
///
/// `is_exported` and `is_imported` may both be true: the declaration is a
/// re-exported import. `dependencies` holds the *names* of other
/// declarations in the same file referenced from this declaration's body or
/// initializer; cross-file influence never flows through `dependencies`,
/// only through imported-name matching during propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: DeclarationKind,

    #[serde(default)]
    pub is_exported: bool,

    #[serde(default)]
    pub is_imported: bool,

    /// Type-level binding (interface, type alias, enum, type-only import).
    #[serde(default)]
    pub is_type_only: bool,

    /// Stable fingerprint of the declaration's normalized defining syntax.
    /// Absent (or empty) means "not computed"; absent and empty compare
    /// equal during diffing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    /// Resolved path or bare module name this binding was imported from.
    /// Present only when `is_imported`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_specifier: Option<String>,

    /// Names of same-file declarations referenced by this declaration.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub dependencies: IndexSet<String>,
}

impl Declaration {
    pub fn new(name: impl Into<String>, kind: DeclarationKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_exported: false,
            is_imported: false,
            is_type_only: false,
            content_hash: None,
            module_specifier: None,
            dependencies: IndexSet::new(),
        }
    }

    /// Mark the declaration as exported.
    pub fn exported(mut self) -> Self {
        self.is_exported = true;
        self
    }

    /// Mark the declaration as imported from `specifier`.
    pub fn imported(mut self, specifier: impl Into<String>) -> Self {
        self.is_imported = true;
        self.module_specifier = Some(specifier.into());
        self
    }

    /// Mark the declaration as a type-level binding.
    pub fn type_only(mut self) -> Self {
        self.is_type_only = true;
        self
    }

    /// Set the content fingerprint.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    /// Record a same-file reference; duplicates are no-ops.
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.insert(name.into());
        self
    }

    /// Fingerprint with absent normalized to the empty string.
    #[inline]
    pub(crate) fn hash_or_empty(&self) -> &str {
        self.content_hash.as_deref().unwrap_or("")
    }
}

/// File shape: a plain script, or a composite document bundling script,
/// markup and style sections (consumed as an indivisible unit during
/// propagation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    Script,
    CompositeDocument,
}

impl FileType {
    /// Classify a path by extension.
    pub fn from_path(path: &str) -> Self {
        if Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("vue"))
        {
            FileType::CompositeDocument
        } else {
            FileType::Script
        }
    }
}

/// Full analysis result for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Canonical path, the primary key within a snapshot.
    pub path: String,

    pub file_type: FileType,

    /// The file was requested for analysis but is missing from disk.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not_exist: bool,

    /// Resolved paths / bare module names this file imports from.
    #[serde(default)]
    pub module_specifiers: IndexSet<String>,

    /// Top-level declarations in encounter order. Duplicate names are kept
    /// here; name-keyed consumers apply last-declaration-wins.
    #[serde(default)]
    pub declare_vars: Vec<Declaration>,

    /// Paths of files that import from this file. Derived from the full
    /// snapshot, sorted for deterministic traversal and serialization.
    #[serde(default)]
    pub parent_modules: BTreeSet<String>,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            file_type,
            not_exist: false,
            module_specifiers: IndexSet::new(),
            declare_vars: Vec::new(),
            parent_modules: BTreeSet::new(),
        }
    }

    /// Record for a file that is missing from disk.
    pub fn missing(path: impl Into<String>) -> Self {
        let path = path.into();
        let file_type = FileType::from_path(&path);
        let mut record = Self::new(path, file_type);
        record.not_exist = true;
        record
    }

    /// Empty record of the classified file type, used when a front-end
    /// could not produce a structured result (soft failure).
    pub fn degraded(path: impl Into<String>) -> Self {
        let path = path.into();
        let file_type = FileType::from_path(&path);
        Self::new(path, file_type)
    }

    pub fn with_specifier(mut self, specifier: impl Into<String>) -> Self {
        self.module_specifiers.insert(specifier.into());
        self
    }

    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declare_vars.push(declaration);
        self
    }

    /// Name-keyed view of `declare_vars`, last declaration winning per name
    /// but keeping each name's first-encounter position.
    pub fn declarations_by_name(&self) -> indexmap::IndexMap<&str, &Declaration> {
        let mut map = indexmap::IndexMap::with_capacity(self.declare_vars.len());
        for decl in &self.declare_vars {
            map.insert(decl.name.as_str(), decl);
        }
        map
    }
}

/// Path-keyed collection of [`FileRecord`]s: the persisted graph state.
///
/// Serializes as an array of records ordered by path so artifacts are
/// byte-stable regardless of analysis completion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<FileRecord>", into = "Vec<FileRecord>")]
pub struct Snapshot {
    files: FxHashMap<String, FileRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.files.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut FileRecord> {
        self.files.get_mut(path)
    }

    /// Insert `record` keyed by its path, replacing any previous record.
    pub fn insert(&mut self, record: FileRecord) {
        self.files.insert(record.path.clone(), record);
    }

    pub fn remove(&mut self, path: &str) -> Option<FileRecord> {
        self.files.remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileRecord)> {
        self.files.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut FileRecord)> {
        self.files.iter_mut()
    }

    /// Paths in sorted order.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.files.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Records ordered by path, the serialized form.
    pub fn to_records(&self) -> Vec<FileRecord> {
        let mut records: Vec<FileRecord> = self.files.values().cloned().collect();
        records.sort_unstable_by(|a, b| a.path.cmp(&b.path));
        records
    }
}

impl From<Vec<FileRecord>> for Snapshot {
    fn from(records: Vec<FileRecord>) -> Self {
        let mut snapshot = Snapshot::new();
        for record in records {
            snapshot.insert(record);
        }
        snapshot
    }
}

impl From<Snapshot> for Vec<FileRecord> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.to_records()
    }
}

impl FromIterator<FileRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for record in iter {
            snapshot.insert(record);
        }
        snapshot
    }
}

/// One completed impact chain: `paths` runs from the changed file up to the
/// terminal ancestor, `name` is the terminal node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectPath {
    pub name: String,
    pub paths: Vec<String>,
}

/// All impact chains rooted at one changed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectResult {
    pub path: String,
    pub effect_paths: Vec<EffectPath>,
}

/// Per-run impact artifact, ordered by the run's changed-file input order.
pub type ImpactReport = Vec<EffectResult>;
