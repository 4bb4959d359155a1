//! Go syntax layer: positions, the lowered AST, and the tree-sitter parser.
//!
//! Source files are parsed with the `tree-sitter-go` grammar and lowered
//! into an owned AST subset (see [`ast`]) that carries exactly the shapes
//! the analysis needs: type declarations with field tags, function and
//! method declarations with parameter groups, and the statement and
//! expression forms taint tracking inspects.

pub mod ast;
pub mod parser;

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Identifies a parsed file within a [`FileSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FileId(pub u32);

/// Identifies an AST node within one analyzed package.
///
/// Node ids are dense and assigned in lowering order by [`NodeIdGen`].
/// They key the resolver's definition, use, and type tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub u32);

/// Monotonic [`NodeId`] allocator, one per analyzed package.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// A source position: file, 1-indexed line, 1-indexed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pos {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
}

impl Pos {
    #[inline]
    pub fn new(file: FileId, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }
}

/// The set of files belonging to one analyzed package.
///
/// Resolves a [`Pos`] to a printable `file:line:col` location.
#[derive(Debug, Default, Clone)]
pub struct FileSet {
    names: Vec<PathBuf>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its id.
    pub fn add(&mut self, name: impl Into<PathBuf>) -> FileId {
        let id = FileId(self.names.len() as u32);
        self.names.push(name.into());
        id
    }

    /// Path of a registered file.
    pub fn name(&self, id: FileId) -> &std::path::Path {
        &self.names[id.0 as usize]
    }

    /// Whether `id` refers to a file in this set.
    #[inline]
    pub fn contains(&self, id: FileId) -> bool {
        (id.0 as usize) < self.names.len()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Render a position as `file:line:col`.
    pub fn display(&self, pos: Pos) -> String {
        format!("{}:{}:{}", self.name(pos.file).display(), pos.line, pos.column)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
