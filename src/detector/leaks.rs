//! The leak detector: Phase 2 of the analysis.
//!
//! For every collected sink call, each positional argument runs through a
//! first-match-wins decision: tainted variable, tainted call, whole
//! sensitive struct — each of which short-circuits the argument — then a
//! top-down walk of the argument that reports every sensitive field
//! access and recurses into the arguments of nested calls (wrapper calls
//! like `slog.Any("data", cfg)`), without re-entering a visited subtree.

use crate::resolve::TypeInfo;
use crate::syntax::ast::{walk_expr, Expr};

use super::fields::FieldCatalog;
use super::finding::{Finding, RuleId};
use super::taint::TaintTracker;

pub struct LeakDetector<'a> {
    info: &'a TypeInfo,
    catalog: &'a FieldCatalog<'a>,
    tracker: &'a TaintTracker<'a>,
}

impl<'a> LeakDetector<'a> {
    pub fn new(
        info: &'a TypeInfo,
        catalog: &'a FieldCatalog<'a>,
        tracker: &'a TaintTracker<'a>,
    ) -> Self {
        Self {
            info,
            catalog,
            tracker,
        }
    }

    /// Examine every argument of a sink call.
    pub fn check_call(&self, call: &Expr, findings: &mut Vec<Finding>) {
        let Expr::Call { args, .. } = call else { return };
        for arg in args {
            self.check_arg(arg, findings);
        }
    }

    /// The per-argument decision procedure.
    pub fn check_arg(&self, arg: &Expr, findings: &mut Vec<Finding>) {
        // Rule 1: a bare identifier bound to a tainted variable.
        if let Expr::Ident(ident) = arg {
            if let Some(source) = self
                .info
                .use_of(ident.id)
                .and_then(|sym| self.tracker.var_source(sym))
            {
                findings.push(Finding::new(
                    arg.pos(),
                    RuleId::SensitiveVar,
                    format!(
                        "variable \"{}\" contains sensitive field \"{}\" (tagged with sensitive:\"true\")",
                        ident.name, source.field_name
                    ),
                ));
                return;
            }
        }

        // Rule 2: a call whose callee returns tainted data.
        if matches!(arg, Expr::Call { .. }) {
            if let Some(source) = self.tracker.call_source(arg) {
                findings.push(Finding::new(
                    arg.pos(),
                    RuleId::SensitiveCall,
                    format!(
                        "function call returns sensitive field \"{}\" (tagged with sensitive:\"true\")",
                        source.field_name
                    ),
                ));
                return;
            }
        }

        // Rule 3: the argument's own type is a sensitive struct,
        // auto-dereferencing a single pointer.
        if let Some((pkg, name)) = self.info.type_of(arg.id()).deref_once().as_named() {
            if self.catalog.struct_is_sensitive(pkg, name) {
                findings.push(Finding::new(
                    arg.pos(),
                    RuleId::SensitiveStruct,
                    format!(
                        "struct '{}' contains sensitive fields and should not be logged entirely",
                        name
                    ),
                ));
                return;
            }
        }

        // Rule 4: walk the argument for sensitive field accesses; recurse
        // into the arguments of nested calls.
        walk_expr(arg, &mut |expr| match expr {
            Expr::Selector { base, field, .. } => {
                if let Some((pkg, name)) = self.info.type_of(base.id()).deref_once().as_named() {
                    if self.catalog.is_sensitive_field(pkg, name, &field.name) {
                        findings.push(Finding::new(
                            expr.pos(),
                            RuleId::SensitiveField,
                            format!(
                                "sensitive field '{}.{}' should not be logged (tagged with sensitive:\"true\")",
                                name, field.name
                            ),
                        ));
                    }
                }
                true
            }
            Expr::Call { args, .. } => {
                for nested in args {
                    self.check_arg(nested, findings);
                }
                false
            }
            _ => true,
        });
    }
}
