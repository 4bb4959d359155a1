//! The driver: package pattern expansion, file loading, and pass
//! construction.
//!
//! Patterns name a directory (`./cmd/api`) or a recursive root
//! (`./...`, `services/...`). Each directory with `.go` files becomes one
//! package; `_test.go` files are excluded, matching the toolchain's
//! non-test load mode. Package paths come from the nearest `go.mod`
//! module line when one exists, falling back to the directory path.
//!
//! All packages are parsed first so the struct universe spans every
//! loaded package, then each package is resolved into an independent
//! [`Pass`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use rayon::prelude::*;

use crate::error::{HoundError, Result};
use crate::resolve::{self, resolver, FieldDef, StructDef, TypeUniverse};
use crate::syntax::ast::{Decl, File, TypeDeclKind};
use crate::syntax::parser::GoParser;
use crate::syntax::{FileSet, NodeIdGen};
use crate::Pass;

/// Directory names the recursive pattern never descends into, mirroring
/// the Go toolchain's `./...` semantics.
const SKIP_DIR_NAMES: &[&str] = &["vendor", "testdata"];

/// One parsed-but-unresolved package.
struct ParsedPackage {
    pkg_path: String,
    fset: FileSet,
    files: Vec<File>,
}

/// Expand `patterns`, parse every matched package, and resolve each into
/// a pass. Parsing and resolution run in parallel across packages.
pub fn load_packages(patterns: &[String]) -> Result<Vec<Pass>> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        expand_pattern(pattern, &mut dirs)?;
    }
    dirs.sort();
    dirs.dedup();

    let parsed: Vec<ParsedPackage> = dirs
        .par_iter()
        .map(|dir| parse_dir(dir))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    let mut universe = TypeUniverse::new();
    for pkg in &parsed {
        add_package_types(&mut universe, &pkg.pkg_path, &pkg.files);
    }
    let universe = Arc::new(universe);
    tracing::debug!(
        packages = parsed.len(),
        structs = universe.len(),
        "packages parsed"
    );

    let passes = parsed
        .into_par_iter()
        .map(|pkg| {
            let info = resolve::resolve_package(&pkg.pkg_path, &pkg.files, &universe);
            Pass {
                fset: pkg.fset,
                files: pkg.files,
                pkg: pkg.pkg_path,
                info,
                universe: Arc::clone(&universe),
            }
        })
        .collect();

    Ok(passes)
}

/// Build a pass directly from in-memory sources, all in one package.
/// Useful for tests and for embedding the analyzer.
pub fn parse_package_from_sources(pkg_path: &str, sources: &[(&str, &str)]) -> Result<Pass> {
    let mut parser = GoParser::new()?;
    let mut fset = FileSet::new();
    let mut ids = NodeIdGen::new();
    let mut files = Vec::new();
    for (name, source) in sources {
        let id = fset.add(*name);
        files.push(parser.parse_file(id, name, source, &mut ids)?);
    }
    let mut universe = TypeUniverse::new();
    add_package_types(&mut universe, pkg_path, &files);
    let universe = Arc::new(universe);
    let info = resolve::resolve_package(pkg_path, &files, &universe);
    Ok(Pass {
        fset,
        files,
        pkg: pkg_path.to_string(),
        info,
        universe,
    })
}

/// Single-package universe, for unit tests of the catalog and resolver.
pub fn build_universe(pkg_path: &str, files: &[File]) -> TypeUniverse {
    let mut universe = TypeUniverse::new();
    add_package_types(&mut universe, pkg_path, files);
    universe
}

/// Record every struct declaration of a package into the universe.
pub fn add_package_types(universe: &mut TypeUniverse, pkg_path: &str, files: &[File]) {
    for file in files {
        let imports = resolver::import_map(file);
        for decl in &file.decls {
            let Decl::Type(td) = decl else { continue };
            let TypeDeclKind::Struct(st) = &td.kind else {
                continue;
            };
            let fields = st
                .fields
                .iter()
                .map(|f| FieldDef {
                    names: f.names.iter().map(|n| n.name.clone()).collect(),
                    ty: resolver::resolve_type_expr_in(&f.ty, pkg_path, &imports),
                    tag: f.tag.clone(),
                    embedded: f.names.is_empty(),
                })
                .collect();
            universe.insert(StructDef {
                pkg: pkg_path.to_string(),
                name: td.name.name.clone(),
                fields,
            });
        }
    }
}

// ---------------------------------------------------------------------
// Pattern expansion
// ---------------------------------------------------------------------

fn expand_pattern(pattern: &str, dirs: &mut Vec<PathBuf>) -> Result<()> {
    if let Some(root) = pattern.strip_suffix("...") {
        let root = root.trim_end_matches('/');
        let root = if root.is_empty() || root == "." { "." } else { root };
        expand_recursive(Path::new(root), dirs)
    } else {
        let path = Path::new(pattern);
        if !path.is_dir() {
            return Err(HoundError::Config(format!(
                "package pattern does not name a directory: {pattern}"
            )));
        }
        if dir_has_go_files(path)? {
            dirs.push(path.to_path_buf());
        }
        Ok(())
    }
}

fn expand_recursive(root: &Path, dirs: &mut Vec<PathBuf>) -> Result<()> {
    if !root.is_dir() {
        return Err(HoundError::Config(format!(
            "package pattern root does not exist: {}",
            root.display()
        )));
    }

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_some_and(|t| t.is_dir()) {
                !(SKIP_DIR_NAMES.contains(&name.as_ref()) || name.starts_with('_'))
            } else {
                true
            }
        })
        .build();

    let mut found: Vec<PathBuf> = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if is_loadable_go_file(path) {
            if let Some(parent) = path.parent() {
                found.push(parent.to_path_buf());
            }
        }
    }
    found.sort();
    found.dedup();
    dirs.extend(found);
    Ok(())
}

fn dir_has_go_files(dir: &Path) -> Result<bool> {
    for entry in fs::read_dir(dir).map_err(|e| HoundError::io_with_path(e, dir))? {
        let entry = entry.map_err(|e| HoundError::io_with_path(e, dir))?;
        if is_loadable_go_file(&entry.path()) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn is_loadable_go_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go") && !name.starts_with('.')
}

// ---------------------------------------------------------------------
// Package parsing
// ---------------------------------------------------------------------

/// Parse one directory into at most one package. Directories whose files
/// fail to read are reported; unparsable files surface as errors.
fn parse_dir(dir: &Path) -> Result<Option<ParsedPackage>> {
    let mut go_files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| HoundError::io_with_path(e, dir))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_loadable_go_file(p))
        .collect();
    go_files.sort();

    if go_files.is_empty() {
        return Ok(None);
    }

    let pkg_path = package_path(dir);
    let mut parser = GoParser::new()?;
    let mut fset = FileSet::new();
    let mut ids = NodeIdGen::new();
    let mut files = Vec::new();

    for path in &go_files {
        let source =
            fs::read_to_string(path).map_err(|e| HoundError::io_with_path(e, path))?;
        let display = clean_path(path);
        let id = fset.add(display.clone());
        files.push(parser.parse_file(id, &display, &source, &mut ids)?);
    }

    Ok(Some(ParsedPackage {
        pkg_path,
        fset,
        files,
    }))
}

/// Derive the import path of a directory: module path from the nearest
/// `go.mod` plus the relative directory, or the cleaned directory path
/// when no module is found.
fn package_path(dir: &Path) -> String {
    let mut current = Some(dir);
    while let Some(candidate) = current {
        let go_mod = candidate.join("go.mod");
        if go_mod.is_file() {
            if let Some(module) = read_module_line(&go_mod) {
                let rel = dir.strip_prefix(candidate).unwrap_or(Path::new(""));
                return if rel.as_os_str().is_empty() {
                    module
                } else {
                    format!("{module}/{}", rel.to_string_lossy().replace('\\', "/"))
                };
            }
        }
        current = candidate.parent();
    }
    clean_path(dir)
}

fn read_module_line(go_mod: &Path) -> Option<String> {
    let text = fs::read_to_string(go_mod).ok()?;
    for line in text.lines() {
        if let Some(rest) = line.trim().strip_prefix("module ") {
            return Some(rest.trim().to_string());
        }
    }
    None
}

fn clean_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    s.strip_prefix("./").unwrap_or(&s).to_string()
}
