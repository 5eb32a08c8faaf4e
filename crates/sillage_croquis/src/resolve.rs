//! Module specifier resolution.
//!
//! Turns the raw specifier text of an import into the canonical form used
//! as a graph edge: known runtime built-ins and installed packages pass
//! through as bare names, everything else resolves to an absolute path.
//! Front-ends call this while producing records; the graph engine itself
//! only ever sees the resolved strings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use phf::phf_set;
use sillage_carton::paths::{resolve_from, to_slash_string};

/// Runtime modules that are always resolvable bare names.
static BUILTIN_MODULES: phf::Set<&'static str> = phf_set! {
    "assert",
    "buffer",
    "child_process",
    "crypto",
    "dns",
    "events",
    "fs",
    "http",
    "https",
    "net",
    "os",
    "path",
    "querystring",
    "readline",
    "stream",
    "string_decoder",
    "tls",
    "url",
    "util",
    "zlib",
};

/// Index files probed when a specifier resolves to a directory.
const INDEX_CANDIDATES: &[&str] = &[
    "index.ts",
    "index.tsx",
    "index.js",
    "index.jsx",
    "index.d.ts",
    "index.vue",
];

/// Extensions appended when a specifier resolves to no exact file.
const EXTENSION_CANDIDATES: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".d.ts", ".vue"];

/// Resolution rules for a project: the base resolution directory and the
/// configured path-alias patterns (`"@/*"` style keys mapping to target
/// path templates, tried in longest-prefix order).
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// Project root all alias targets resolve against.
    pub base_dir: PathBuf,
    /// Optional base URL, joined onto `base_dir`.
    pub base_url: Option<String>,
    /// Alias pattern -> target path templates. Only the first template of
    /// a pattern is consulted.
    pub paths: BTreeMap<String, Vec<String>>,
}

impl CompilerOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            base_url: None,
            paths: BTreeMap::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_alias(mut self, pattern: impl Into<String>, targets: Vec<String>) -> Self {
        self.paths.insert(pattern.into(), targets);
        self
    }

    /// Directory alias targets resolve against.
    fn resolution_dir(&self) -> PathBuf {
        match self.base_url.as_deref() {
            Some(base_url) if !base_url.is_empty() => resolve_from(&self.base_dir, base_url),
            _ => self.base_dir.clone(),
        }
    }
}

/// Resolve `specifier` as seen from `current_dir`.
///
/// Classification, in order:
/// 1. built-in or installed bare name -> returned unchanged;
/// 2. relative path -> absolute path, probing index files and extensions,
///    falling back to the unresolved absolute candidate;
/// 3. alias match (longest prefix wins) -> substituted and probed the
///    same way against the base resolution directory;
/// 4. unmatched bare specifier -> returned unchanged.
pub fn resolve_module_specifier(
    specifier: &str,
    options: &CompilerOptions,
    current_dir: &Path,
    installed: &[String],
) -> String {
    if specifier.is_empty() {
        return String::new();
    }

    if is_builtin(specifier) || installed.iter().any(|dep| dep == specifier) {
        return specifier.to_string();
    }

    if is_relative(specifier) {
        return probe(resolve_from(current_dir, specifier));
    }

    let Some(pattern) = best_alias_pattern(specifier, &options.paths) else {
        // bare import without an alias: keep as-is
        return specifier.to_string();
    };

    let targets = &options.paths[&pattern];
    let Some(template) = targets.first() else {
        return specifier.to_string();
    };

    let prefix = pattern.replacen("/*", "", 1);
    let wildcard = if pattern.contains('*') {
        &specifier[prefix.len()..]
    } else {
        ""
    };
    let substituted = template.replacen('*', wildcard, 1);
    probe(resolve_from(&options.resolution_dir(), &substituted))
}

/// Probe `candidate` as an exact file, a directory with an index file, or
/// a base missing its extension. Falls back to the lexical candidate.
fn probe(candidate: PathBuf) -> String {
    if candidate.is_file() {
        return to_slash_string(&candidate);
    }

    if candidate.is_dir() {
        for index in INDEX_CANDIDATES {
            let indexed = candidate.join(index);
            if indexed.is_file() {
                return to_slash_string(&indexed);
            }
        }
    }

    let base = candidate.as_os_str().to_string_lossy().into_owned();
    for ext in EXTENSION_CANDIDATES {
        let with_ext = PathBuf::from(format!("{base}{ext}"));
        if with_ext.is_file() {
            return to_slash_string(&with_ext);
        }
    }

    to_slash_string(&candidate)
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

fn is_builtin(specifier: &str) -> bool {
    specifier.starts_with("node:") || BUILTIN_MODULES.contains(specifier)
}

/// Longest-prefix alias match: `"@/*"` matches `"@"` itself and anything
/// under `"@/"`; among competing patterns the longest cleaned prefix wins.
fn best_alias_pattern(specifier: &str, paths: &BTreeMap<String, Vec<String>>) -> Option<String> {
    let mut best: Option<(usize, &String)> = None;
    for pattern in paths.keys() {
        let prefix = pattern.replacen("/*", "", 1);
        let matched = specifier == prefix
            || specifier
                .strip_prefix(&prefix)
                .is_some_and(|rest| rest.starts_with('/'));
        if matched {
            match best {
                Some((len, _)) if len >= prefix.len() => {}
                _ => best = Some((prefix.len(), pattern)),
            }
        }
    }
    best.map(|(_, pattern)| pattern.clone())
}
