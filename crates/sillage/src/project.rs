//! Project configuration loading and file traversal.
//!
//! Reads the project's compiler configuration (base URL + path aliases)
//! and the dependency manifest, and walks the project tree for analyzable
//! files. Configuration failures are fatal: without resolution rules no
//! meaningful graph can be built, so they abort a run before any
//! scheduling happens.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::Deserialize;
use sillage_carton::paths::to_slash_string;
use sillage_croquis::CompilerOptions;
use thiserror::Error;
use tracing::debug;

/// The project's compiler configuration or dependency manifest could not
/// be read or parsed. Always fatal to the run.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// File-traversal filters. Extensions match by suffix, so `.d.ts` style
/// multi-dot extensions work.
#[derive(Debug, Clone)]
pub struct TraverseOptions {
    pub include_extensions: Vec<String>,
    pub exclude_extensions: Vec<String>,
    pub exclude_dirs: Vec<String>,
}

impl Default for TraverseOptions {
    fn default() -> Self {
        Self {
            include_extensions: vec![".ts".into(), ".js".into(), ".vue".into()],
            exclude_extensions: Vec::new(),
            exclude_dirs: Vec::new(),
        }
    }
}

impl TraverseOptions {
    /// Whether a file with this name passes the extension filters.
    pub fn matches(&self, file_name: &str) -> bool {
        if self
            .exclude_extensions
            .iter()
            .any(|ext| file_name.ends_with(ext.as_str()))
        {
            return false;
        }
        self.include_extensions
            .iter()
            .any(|ext| file_name.ends_with(ext.as_str()))
    }
}

/// Everything a run needs to know about a project before scheduling.
#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub compiler_options: CompilerOptions,
    /// Bare module names considered resolvable third-party packages.
    pub installed_dependencies: Vec<String>,
    /// Analyzable files under the root, sorted. Empty when traversal was
    /// not requested (incremental runs analyze only the modified list).
    pub files: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsconfigFile {
    #[serde(default)]
    compiler_options: TsconfigCompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsconfigCompilerOptions {
    base_url: Option<String>,
    #[serde(default)]
    paths: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, serde_json::Value>,
}

impl PackageManifest {
    fn dependency_names(self) -> Vec<String> {
        let mut names: Vec<String> = self
            .dependencies
            .into_keys()
            .chain(self.dev_dependencies.into_keys())
            .chain(self.peer_dependencies.into_keys())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

/// Load configuration and (optionally) traverse the project tree.
pub fn load_project(
    root: &Path,
    tsconfig_file_name: &str,
    traverse: &TraverseOptions,
    traverse_files: bool,
) -> Result<Project, ProjectError> {
    let tsconfig: TsconfigFile = read_json(&root.join(tsconfig_file_name))?;
    let manifest: PackageManifest = read_json(&root.join("package.json"))?;

    let compiler_options = CompilerOptions {
        base_dir: root.to_path_buf(),
        base_url: tsconfig.compiler_options.base_url,
        paths: tsconfig.compiler_options.paths,
    };

    let files = if traverse_files {
        traverse_project(root, traverse)
    } else {
        Vec::new()
    };
    debug!(files = files.len(), "project loaded");

    Ok(Project {
        root: root.to_path_buf(),
        compiler_options,
        installed_dependencies: manifest.dependency_names(),
        files,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ProjectError> {
    let content = sillage_carton::fs::read_to_string(path).map_err(|source| ProjectError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ProjectError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Collect analyzable files under `root`, sorted for determinism.
fn traverse_project(root: &Path, options: &TraverseOptions) -> Vec<String> {
    let exclude_dirs = options.exclude_dirs.clone();
    let walker = WalkBuilder::new(root)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if !is_dir {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !exclude_dirs.iter().any(|dir| dir.as_str() == name)
        })
        .build();

    let mut files: Vec<String> = walker
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter(|entry| options.matches(&entry.file_name().to_string_lossy()))
        .map(|entry| to_slash_string(entry.path()))
        .collect();
    files.sort_unstable();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use sillage_carton::fs::write_string;
    use tempfile::TempDir;

    fn seed_config(root: &Path) {
        write_string(
            &root.join("tsconfig.json"),
            r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@/*": ["src/*"] } } }"#,
        )
        .unwrap();
        write_string(
            &root.join("package.json"),
            r#"{ "dependencies": { "vuex": "^4.0.0" }, "devDependencies": { "vite": "^5.0.0" } }"#,
        )
        .unwrap();
    }

    #[test]
    fn test_load_project_reads_config() {
        let tmp = TempDir::new().unwrap();
        seed_config(tmp.path());
        write_string(&tmp.path().join("src/a.ts"), "").unwrap();
        write_string(&tmp.path().join("src/App.vue"), "").unwrap();
        write_string(&tmp.path().join("src/readme.md"), "").unwrap();

        let project =
            load_project(tmp.path(), "tsconfig.json", &TraverseOptions::default(), true).unwrap();

        assert_eq!(project.installed_dependencies, vec!["vite", "vuex"]);
        assert_eq!(project.compiler_options.base_url.as_deref(), Some("."));
        assert!(project.compiler_options.paths.contains_key("@/*"));
        assert_eq!(project.files.len(), 2);
        assert!(project.files.iter().all(|f| !f.ends_with(".md")));
    }

    #[test]
    fn test_missing_config_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let error =
            load_project(tmp.path(), "tsconfig.json", &TraverseOptions::default(), true)
                .unwrap_err();
        assert!(matches!(error, ProjectError::Read { .. }));
    }

    #[test]
    fn test_malformed_config_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_string(&tmp.path().join("tsconfig.json"), "{ nope").unwrap();
        write_string(&tmp.path().join("package.json"), "{}").unwrap();
        let error =
            load_project(tmp.path(), "tsconfig.json", &TraverseOptions::default(), true)
                .unwrap_err();
        assert!(matches!(error, ProjectError::Parse { .. }));
    }

    #[test]
    fn test_traverse_honors_exclude_dirs() {
        let tmp = TempDir::new().unwrap();
        seed_config(tmp.path());
        write_string(&tmp.path().join("src/a.ts"), "").unwrap();
        write_string(&tmp.path().join("node_modules/pkg/index.ts"), "").unwrap();

        let traverse = TraverseOptions {
            exclude_dirs: vec!["node_modules".into()],
            ..Default::default()
        };
        let project = load_project(tmp.path(), "tsconfig.json", &traverse, true).unwrap();
        assert_eq!(project.files.len(), 1);
        assert!(project.files[0].ends_with("src/a.ts"));
    }

    #[test]
    fn test_extension_suffix_matching() {
        let traverse = TraverseOptions {
            include_extensions: vec![".ts".into()],
            exclude_extensions: vec![".d.ts".into()],
            exclude_dirs: Vec::new(),
        };
        assert!(traverse.matches("tree.ts"));
        assert!(!traverse.matches("tree.d.ts"));
        assert!(!traverse.matches("style.css"));
    }

    #[test]
    fn test_incremental_load_skips_traversal() {
        let tmp = TempDir::new().unwrap();
        seed_config(tmp.path());
        write_string(&tmp.path().join("src/a.ts"), "").unwrap();
        let project =
            load_project(tmp.path(), "tsconfig.json", &TraverseOptions::default(), false).unwrap();
        assert!(project.files.is_empty());
    }
}
