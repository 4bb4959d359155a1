//! Taint tracking.
//!
//! Phase 1a seeds taint while walking each function body once: a fresh
//! `:=` binding whose right-hand side classifies as sensitive taints the
//! new variable; a single-expression `return` of a sensitive value taints
//! the enclosing function. Phase 1b then expands taint interprocedurally:
//! up to five rounds over the function registry map tainted call
//! arguments onto the callee's positional parameters, until a round adds
//! no new tainted variable.
//!
//! `tainted_vars` only ever grows; re-assignments (`=`) of existing
//! bindings are not modeled.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::resolve::{SymbolId, TypeInfo};
use crate::syntax::ast::{self, AssignStmt, Expr};
use crate::syntax::Pos;

use super::fields::FieldCatalog;
use super::registry::FunctionRegistry;

/// Propagation rounds are capped to keep runtime predictable; chains
/// deeper than this remain undetected.
const MAX_ROUNDS: usize = 5;

/// Provenance of a tainted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveSource {
    /// The original sensitive field, formatted `Type.Field`.
    pub field_name: String,
    /// Position of the access or argument that introduced this binding.
    pub origin: Pos,
    /// Human-readable flow steps from the field to the current binding.
    pub flow_path: Vec<String>,
}

/// The taint fact tables of one package analysis.
pub struct TaintTracker<'a> {
    pkg: &'a str,
    info: &'a TypeInfo,
    catalog: &'a FieldCatalog<'a>,
    tainted_vars: FxHashMap<SymbolId, SensitiveSource>,
    tainted_funcs: FxHashMap<SymbolId, SensitiveSource>,
    tainted_params: FxHashMap<SymbolId, SensitiveSource>,
    current_func: Option<SymbolId>,
}

impl<'a> TaintTracker<'a> {
    pub fn new(pkg: &'a str, info: &'a TypeInfo, catalog: &'a FieldCatalog<'a>) -> Self {
        Self {
            pkg,
            info,
            catalog,
            tainted_vars: FxHashMap::default(),
            tainted_funcs: FxHashMap::default(),
            tainted_params: FxHashMap::default(),
            current_func: None,
        }
    }

    /// Set the function whose body is being seeded.
    pub fn set_current_function(&mut self, func: Option<SymbolId>) {
        self.current_func = func;
    }

    /// Seed from `lhs := rhs`. Each `(lhs_i, rhs_i)` pair is handled
    /// independently when indexable; only definition sites are recorded.
    pub fn collect_define(&mut self, assign: &AssignStmt) {
        for (i, lhs) in assign.lhs.iter().enumerate() {
            if i >= assign.rhs.len() {
                continue;
            }
            let Expr::Ident(ident) = lhs else { continue };
            let Some(var) = self.info.def_of(ident.id) else {
                continue;
            };
            if let Some(source) = self.classify(&assign.rhs[i]) {
                tracing::debug!(
                    var = %ident.name,
                    field = %source.field_name,
                    "tainted variable"
                );
                self.tainted_vars.insert(var, source);
            }
        }
    }

    /// Seed from a return statement. Only single-expression returns are
    /// modeled; multi-valued returns are out of scope.
    pub fn collect_return(&mut self, results: &[Expr]) {
        if results.len() != 1 {
            return;
        }
        if let Some(source) = self.classify(&results[0]) {
            if let Some(func) = self.current_func {
                tracing::debug!(field = %source.field_name, "tainted function return");
                self.tainted_funcs.insert(func, source);
            }
        }
    }

    /// Decide whether an expression carries taint.
    ///
    /// Three shapes classify: a sensitive field access (auto-dereferencing
    /// a single pointer), a use of a tainted variable, and a call to a
    /// function whose return is tainted.
    pub fn classify(&self, expr: &Expr) -> Option<SensitiveSource> {
        match expr {
            Expr::Selector { base, field, .. } => {
                let base_ty = self.info.type_of(base.id());
                let (pkg, name) = base_ty.deref_once().as_named()?;
                if !self.catalog.is_sensitive_field(pkg, name, &field.name) {
                    return None;
                }
                let field_name = format!("{}.{}", name, field.name);
                Some(SensitiveSource {
                    flow_path: vec![field_name.clone()],
                    field_name,
                    origin: expr.pos(),
                })
            }
            Expr::Ident(ident) => {
                let sym = self.info.use_of(ident.id)?;
                self.tainted_vars.get(&sym).cloned()
            }
            Expr::Call { func, .. } => {
                let callee = callee_symbol(self.info, func)?;
                self.tainted_funcs.get(&callee).cloned()
            }
            _ => None,
        }
    }

    /// Phase 1b: expand taint through same-package call sites until the
    /// fixed point or the round ceiling.
    pub fn propagate(&mut self, registry: &FunctionRegistry<'_>) {
        for round in 0..MAX_ROUNDS {
            let before = self.tainted_vars.len();
            let mut visited: FxHashSet<SymbolId> = FxHashSet::default();

            for &func in registry.order() {
                self.expand_function(func, registry, &mut visited);
            }

            let after = self.tainted_vars.len();
            tracing::debug!(round, before, after, "taint propagation round");
            if after == before {
                break;
            }
        }
    }

    fn expand_function(
        &mut self,
        func: SymbolId,
        registry: &FunctionRegistry<'_>,
        visited: &mut FxHashSet<SymbolId>,
    ) {
        if !visited.insert(func) {
            return;
        }
        let Some(entry) = registry.get(func) else {
            return;
        };
        let Some(body) = entry.body else { return };

        let mut calls: Vec<&Expr> = Vec::new();
        ast::walk_stmts(body, &mut |stmt| {
            for expr in stmt.top_exprs() {
                ast::collect_calls(expr, &mut calls);
            }
        });

        for call in calls {
            self.expand_call(call, registry);
        }
    }

    fn expand_call(&mut self, call: &Expr, registry: &FunctionRegistry<'_>) {
        let Expr::Call { func, args, .. } = call else {
            return;
        };
        let Some(callee) = callee_symbol(self.info, func) else {
            return;
        };
        // Same-package callees only.
        if self.info.symbol(callee).pkg.as_deref() != Some(self.pkg) {
            return;
        }
        let Some(entry) = registry.get(callee) else {
            return;
        };

        let params = entry.params;
        let mut param_idx = 0usize;

        for arg in args {
            if param_idx >= params.len() {
                break;
            }
            let group = &params[param_idx];

            if let Some(source) = self.classify(arg) {
                // Variadic parameters are not mapped.
                if !group.variadic {
                    for name in &group.names {
                        let Some(param) = self.info.def_of(name.id) else {
                            continue;
                        };
                        let mut flow_path = source.flow_path.clone();
                        flow_path.push(format!("parameter '{}'", name.name));
                        let new_source = SensitiveSource {
                            field_name: source.field_name.clone(),
                            origin: arg.pos(),
                            flow_path,
                        };
                        tracing::debug!(
                            param = %name.name,
                            field = %new_source.field_name,
                            flow = ?new_source.flow_path,
                            "tainted parameter"
                        );
                        self.tainted_params.insert(param, new_source.clone());
                        self.tainted_vars.insert(param, new_source);
                    }
                }
            }

            // Advance past any group carrying at least one name; anonymous
            // groups never advance the index.
            if !group.names.is_empty() {
                param_idx += 1;
            }
        }
    }

    /// Source for a tainted variable symbol.
    pub fn var_source(&self, sym: SymbolId) -> Option<&SensitiveSource> {
        self.tainted_vars.get(&sym)
    }

    /// Source for a function whose single return value is tainted.
    pub fn func_source(&self, sym: SymbolId) -> Option<&SensitiveSource> {
        self.tainted_funcs.get(&sym)
    }

    /// Source for a call expression whose callee returns tainted data.
    pub fn call_source(&self, call: &Expr) -> Option<&SensitiveSource> {
        let Expr::Call { func, .. } = call else {
            return None;
        };
        let callee = callee_symbol(self.info, func)?;
        self.tainted_funcs.get(&callee)
    }

    pub fn tainted_var_count(&self) -> usize {
        self.tainted_vars.len()
    }

    pub fn tainted_param_count(&self) -> usize {
        self.tainted_params.len()
    }
}

/// Resolve a callee expression (a bare identifier or a selector) to the
/// symbol it uses.
pub fn callee_symbol(info: &TypeInfo, func: &Expr) -> Option<SymbolId> {
    match func {
        Expr::Ident(ident) => info.use_of(ident.id),
        Expr::Selector { field, .. } => info.use_of(field.id),
        _ => None,
    }
}
