//! Name resolution and type assignment.
//!
//! This layer stands in for the Go type checker: it interns symbols for
//! variables, parameters, functions, and methods; records definition and
//! use sites for identifiers; and assigns best-effort static types to
//! expressions. Consumers compare symbols by [`SymbolId`] identity, never
//! by name text.
//!
//! Typing is deliberately partial. Anything the resolver cannot see types
//! as [`GoType::Unknown`], and unknown is always treated downstream as
//! "not sensitive, not a sink" — an ignorable inconsistency, never an
//! error.

pub mod resolver;
pub mod universe;

use rustc_hash::FxHashMap;

use crate::syntax::NodeId;

pub use resolver::resolve_package;
pub use universe::{FieldDef, StructDef, TypeUniverse};

/// A Go type, as far as the resolver can see it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GoType {
    /// Predeclared types: `string`, `int`, `bool`, …
    Basic(String),
    /// A named (declared) type, keyed by its declaring package path.
    Named { pkg: String, name: String },
    Pointer(Box<GoType>),
    Unknown,
}

impl GoType {
    pub fn named(pkg: impl Into<String>, name: impl Into<String>) -> Self {
        GoType::Named {
            pkg: pkg.into(),
            name: name.into(),
        }
    }

    pub fn pointer_to(elem: GoType) -> Self {
        GoType::Pointer(Box::new(elem))
    }

    /// Strip at most one level of pointer indirection. This implements the
    /// "pointer-to-struct acts as struct" rule.
    #[inline]
    pub fn deref_once(&self) -> &GoType {
        match self {
            GoType::Pointer(elem) => elem,
            other => other,
        }
    }

    /// The `(package path, type name)` pair if this is a named type.
    pub fn as_named(&self) -> Option<(&str, &str)> {
        match self {
            GoType::Named { pkg, name } => Some((pkg, name)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(self, GoType::Pointer(_))
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, GoType::Unknown)
    }
}

/// Interned symbol handle. Stable for one package analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Param,
    Func,
}

/// Receiver info attached to method symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverInfo {
    /// Declaring package path of the receiver's base type.
    pub pkg: String,
    /// Base type name, without the pointer marker.
    pub name: String,
    pub pointer: bool,
}

/// A resolved program entity.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Owning package path. `None` when the symbol could not be attributed
    /// to a package.
    pub pkg: Option<String>,
    /// Receiver of a method symbol.
    pub recv: Option<ReceiverInfo>,
    /// Declared or inferred type, for variables and parameters.
    pub ty: GoType,
    /// Single-result type for functions with exactly one result.
    pub result: Option<GoType>,
}

/// Symbol storage with interning for foreign functions and methods.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    foreign: FxHashMap<ForeignKey, SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ForeignKey {
    pkg: String,
    name: String,
    recv: Option<(String, String, bool)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Intern a function or method of another package. Repeated references
    /// to the same `(package, name, receiver)` yield the same symbol.
    pub fn intern_foreign_func(
        &mut self,
        pkg: &str,
        name: &str,
        recv: Option<ReceiverInfo>,
        result: Option<GoType>,
    ) -> SymbolId {
        let key = ForeignKey {
            pkg: pkg.to_string(),
            name: name.to_string(),
            recv: recv
                .as_ref()
                .map(|r| (r.pkg.clone(), r.name.clone(), r.pointer)),
        };
        if let Some(&id) = self.foreign.get(&key) {
            return id;
        }
        let id = self.push(Symbol {
            name: name.to_string(),
            kind: SymbolKind::Func,
            pkg: Some(pkg.to_string()),
            recv,
            ty: GoType::Unknown,
            result,
        });
        self.foreign.insert(key, id);
        id
    }
}

/// The per-package resolution result: the `types_info` oracle of the pass.
#[derive(Debug, Default)]
pub struct TypeInfo {
    pub symbols: SymbolTable,
    defs: FxHashMap<NodeId, SymbolId>,
    uses: FxHashMap<NodeId, SymbolId>,
    types: FxHashMap<NodeId, GoType>,
}

impl TypeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// The symbol defined by an identifier occurrence, if it is a
    /// definition site.
    #[inline]
    pub fn def_of(&self, id: NodeId) -> Option<SymbolId> {
        self.defs.get(&id).copied()
    }

    /// The symbol an identifier occurrence refers to, if it is a use site.
    #[inline]
    pub fn use_of(&self, id: NodeId) -> Option<SymbolId> {
        self.uses.get(&id).copied()
    }

    /// The static type of an expression node, when known.
    #[inline]
    pub fn type_of(&self, id: NodeId) -> &GoType {
        static UNKNOWN: GoType = GoType::Unknown;
        self.types.get(&id).unwrap_or(&UNKNOWN)
    }

    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.symbols.get(id)
    }

    pub(crate) fn record_def(&mut self, node: NodeId, sym: SymbolId) {
        self.defs.insert(node, sym);
    }

    pub(crate) fn record_use(&mut self, node: NodeId, sym: SymbolId) {
        self.uses.insert(node, sym);
    }

    pub(crate) fn record_type(&mut self, node: NodeId, ty: GoType) {
        if !ty.is_unknown() {
            self.types.insert(node, ty);
        }
    }
}

/// Predeclared Go type names.
pub(crate) fn is_predeclared(name: &str) -> bool {
    matches!(
        name,
        "bool"
            | "byte"
            | "complex64"
            | "complex128"
            | "error"
            | "float32"
            | "float64"
            | "int"
            | "int8"
            | "int16"
            | "int32"
            | "int64"
            | "rune"
            | "string"
            | "uint"
            | "uint8"
            | "uint16"
            | "uint32"
            | "uint64"
            | "uintptr"
            | "any"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deref_once() {
        let t = GoType::pointer_to(GoType::named("p", "T"));
        assert_eq!(t.deref_once(), &GoType::named("p", "T"));
        let u = GoType::named("p", "T");
        assert_eq!(u.deref_once(), &u);
        // Only a single level is stripped.
        let double = GoType::pointer_to(GoType::pointer_to(GoType::named("p", "T")));
        assert!(double.deref_once().is_pointer());
    }

    #[test]
    fn test_intern_foreign_func_is_stable() {
        let mut table = SymbolTable::new();
        let a = table.intern_foreign_func("log/slog", "Info", None, None);
        let b = table.intern_foreign_func("log/slog", "Info", None, None);
        assert_eq!(a, b);
        let c = table.intern_foreign_func("log", "Info", None, None);
        assert_ne!(a, c);
    }
}
