//! Fixture front-end for tests.
//!
//! Parses a line-oriented fixture format into [`FileRecord`]s so the
//! scheduler, merge and facade layers can be exercised against real files
//! on disk without a full source-language front-end. Specifiers go through
//! the real resolver and bodies through the real content hasher, so fixture
//! projects behave like analyzed ones.
//!
//! Format, one declaration per line:
//!
//! ```text
//! # comment
//! import NAME from SPECIFIER
//! export import NAME from SPECIFIER
//! [export] KIND NAME [: dep1 dep2 ...] [= body]
//! !fail
//! ```
//!
//! `KIND` is one of `function class const let var interface type enum`.
//! A `!fail` line makes the whole file fail analysis, for soft-failure
//! tests.

use std::path::Path;

use sillage_carton::hash::content_hash;
use sillage_carton::paths::to_slash_string;

use crate::frontend::{Frontend, FrontendError};
use crate::record::{Declaration, DeclarationKind, FileRecord, FileType};
use crate::resolve::{resolve_module_specifier, CompilerOptions};

/// Front-end over the fixture format.
pub struct FixtureFrontend;

impl Frontend for FixtureFrontend {
    fn analyze(
        &self,
        path: &Path,
        options: &CompilerOptions,
        installed: &[String],
    ) -> Result<FileRecord, FrontendError> {
        let path_str = to_slash_string(path);
        let source = sillage_carton::fs::read_to_string(path)
            .map_err(|e| FrontendError::new(&path_str, e.to_string()))?;
        parse_fixture(path, &source, options, installed)
    }
}

/// Parse fixture `source` as the content of `path`.
pub fn parse_fixture(
    path: &Path,
    source: &str,
    options: &CompilerOptions,
    installed: &[String],
) -> Result<FileRecord, FrontendError> {
    let path_str = to_slash_string(path);
    let current_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut record = FileRecord::new(path_str.clone(), FileType::from_path(&path_str));

    for raw in source.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line == "!fail" {
            return Err(FrontendError::new(&path_str, "fixture marked !fail"));
        }

        let (exported, rest) = match line.strip_prefix("export ") {
            Some(rest) => (true, rest.trim_start()),
            None => (false, line),
        };

        if let Some(rest) = rest.strip_prefix("import ") {
            let mut parts = rest.split_whitespace();
            let (Some(name), Some("from"), Some(specifier)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(FrontendError::new(
                    &path_str,
                    format!("malformed import line: {line}"),
                ));
            };
            let resolved = resolve_module_specifier(specifier, options, current_dir, installed);
            let mut decl = Declaration::new(name, DeclarationKind::Const)
                .imported(resolved.clone())
                .with_hash(content_hash(line));
            decl.is_exported = exported;
            record.module_specifiers.insert(resolved);
            record.declare_vars.push(decl);
            continue;
        }

        let (head, body) = match rest.split_once(" = ") {
            Some((head, body)) => (head.trim(), Some(body.trim())),
            None => (rest, None),
        };
        let (head, deps) = match head.split_once(" : ") {
            Some((head, deps)) => (head.trim(), deps.split_whitespace().collect()),
            None => (head, Vec::new()),
        };

        let mut parts = head.split_whitespace();
        let (Some(kind_token), Some(name)) = (parts.next(), parts.next()) else {
            return Err(FrontendError::new(
                &path_str,
                format!("malformed declaration line: {line}"),
            ));
        };
        let Some(kind) = parse_kind(kind_token) else {
            return Err(FrontendError::new(
                &path_str,
                format!("unknown declaration kind: {kind_token}"),
            ));
        };

        let mut decl = Declaration::new(name, kind).with_hash(content_hash(body.unwrap_or(line)));
        decl.is_exported = exported;
        decl.is_type_only = matches!(
            kind,
            DeclarationKind::Interface | DeclarationKind::TypeAlias | DeclarationKind::Enum
        );
        for dep in deps {
            decl.dependencies.insert(dep.to_string());
        }
        record.declare_vars.push(decl);
    }

    Ok(record)
}

fn parse_kind(token: &str) -> Option<DeclarationKind> {
    Some(match token {
        "function" => DeclarationKind::Function,
        "class" => DeclarationKind::Class,
        "const" => DeclarationKind::Const,
        "let" => DeclarationKind::Let,
        "var" => DeclarationKind::Var,
        "interface" => DeclarationKind::Interface,
        "type" => DeclarationKind::TypeAlias,
        "enum" => DeclarationKind::Enum,
        _ => return None,
    })
}
