//! Function registry: every function and method declaration of the
//! analyzed package, keyed by its defined symbol.
//!
//! Lets the taint tracker map call arguments to callee parameters without
//! re-walking the AST. Bodyless declarations are indexed but contribute no
//! propagation. Iteration order is insertion order, keeping the fixed
//! point deterministic.

use rustc_hash::FxHashMap;

use crate::resolve::SymbolId;
use crate::syntax::ast::{ParamGroup, Stmt};

/// A registered declaration: its parameter groups and body.
#[derive(Debug, Clone, Copy)]
pub struct FuncEntry<'a> {
    pub params: &'a [ParamGroup],
    pub body: Option<&'a [Stmt]>,
}

#[derive(Debug, Default)]
pub struct FunctionRegistry<'a> {
    funcs: FxHashMap<SymbolId, FuncEntry<'a>>,
    order: Vec<SymbolId>,
}

impl<'a> FunctionRegistry<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sym: SymbolId, params: &'a [ParamGroup], body: Option<&'a [Stmt]>) {
        if self.funcs.insert(sym, FuncEntry { params, body }).is_none() {
            self.order.push(sym);
        }
    }

    pub fn get(&self, sym: SymbolId) -> Option<FuncEntry<'a>> {
        self.funcs.get(&sym).copied()
    }

    /// Registered symbols in declaration order.
    pub fn order(&self) -> &[SymbolId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
