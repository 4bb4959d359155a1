//! The analysis core.
//!
//! One call to [`analyze`] runs the two-phase pipeline over a single
//! package pass:
//!
//! - **Phase 1 — collection.** The field catalog is frozen first. Then a
//!   single traversal per function body registers declarations, seeds
//!   taint from `:=` definitions and single-valued returns, and collects
//!   recognized sink calls in traversal order. The taint tracker then
//!   iterates its interprocedural expansion to a fixed point.
//! - **Phase 2 — detection.** Each argument of each collected sink call
//!   runs through the leak detector's decision procedure.
//!
//! Findings come back ordered by `(sink discovery order, argument index,
//! left-to-right walk)`. The core owns nothing persistent; every fact
//! table dies with the call.

pub mod fields;
pub mod finding;
pub mod leaks;
pub mod registry;
pub mod sinks;
pub mod taint;

pub use fields::{has_sensitive_tag, FieldCatalog};
pub use finding::{Finding, RuleId};
pub use leaks::LeakDetector;
pub use registry::FunctionRegistry;
pub use sinks::SinkRecognizer;
pub use taint::{SensitiveSource, TaintTracker};

use crate::config::Config;
use crate::error::{HoundError, Result};
use crate::syntax::ast::{self, Decl, Expr, Stmt};
use crate::Pass;

/// Analyze one package and return its findings.
///
/// # Errors
///
/// Returns [`HoundError::Analysis`] only on a contract violation (a
/// finding positioned outside the package's file set) — unreachable for
/// correct inputs. Malformed or unresolvable input never errors; it
/// simply produces no findings.
pub fn analyze(pass: &Pass, config: Option<&Config>) -> Result<Vec<Finding>> {
    let span = tracing::debug_span!("analyze", pkg = %pass.pkg);
    let _guard = span.enter();

    // Phase 1: the catalog freezes before any taint is seeded.
    let catalog = FieldCatalog::build(&pass.files, &pass.universe);
    let recognizer = SinkRecognizer::new(&pass.info, config);
    let mut registry = FunctionRegistry::new();
    let mut tracker = TaintTracker::new(&pass.pkg, &pass.info, &catalog);
    let mut sink_calls: Vec<&Expr> = Vec::new();

    for file in &pass.files {
        for decl in &file.decls {
            let Decl::Func(fd) = decl else { continue };
            let sym = pass.info.def_of(fd.name.id);
            if let Some(sym) = sym {
                registry.register(sym, &fd.params, fd.body.as_deref());
            }
            tracker.set_current_function(sym);
            if let Some(body) = &fd.body {
                collect_from_body(body, &mut tracker, &recognizer, &mut sink_calls);
            }
            tracker.set_current_function(None);
        }
    }

    tracker.propagate(&registry);
    tracing::debug!(
        tainted_vars = tracker.tainted_var_count(),
        sinks = sink_calls.len(),
        "phase 1 complete"
    );

    // Phase 2: detection over the collected sinks.
    let detector = LeakDetector::new(&pass.info, &catalog, &tracker);
    let mut findings = Vec::new();
    for call in &sink_calls {
        detector.check_call(call, &mut findings);
    }

    for finding in &findings {
        if !pass.fset.contains(finding.pos.file) {
            return Err(HoundError::Analysis(format!(
                "finding '{}' positioned outside the analyzed package",
                finding.message
            )));
        }
    }

    Ok(findings)
}

/// The single Phase-1 traversal of one function body: seed taint and
/// collect sink calls, in source order.
fn collect_from_body<'a>(
    body: &'a [Stmt],
    tracker: &mut TaintTracker<'_>,
    recognizer: &SinkRecognizer<'_>,
    sink_calls: &mut Vec<&'a Expr>,
) {
    ast::walk_stmts(body, &mut |stmt| {
        match stmt {
            Stmt::Define(assign) => tracker.collect_define(assign),
            Stmt::Return { results, .. } => tracker.collect_return(results),
            _ => {}
        }
        for expr in stmt.top_exprs() {
            let mut calls = Vec::new();
            ast::collect_calls(expr, &mut calls);
            for call in calls {
                if recognizer.is_sink(call) {
                    sink_calls.push(call);
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_package_from_sources;

    fn findings_for(source: &str) -> Vec<Finding> {
        let pass = parse_package_from_sources("example.com/demo", &[("main.go", source)]).unwrap();
        analyze(&pass, None).unwrap()
    }

    #[test]
    fn test_direct_field_to_sink() {
        let findings = findings_for(
            r#"
package main

import "log/slog"

type User struct {
	Name     string
	Password string `sensitive:"true"`
}

func run() {
	u := User{Name: "a", Password: "b"}
	slog.Info("m", u.Password)
}
"#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, RuleId::SensitiveField);
        assert!(findings[0].message.contains("User.Password"));
    }

    #[test]
    fn test_variable_assignment_propagation() {
        let findings = findings_for(
            r#"
package main

import "log"

type User struct {
	Password string `sensitive:"true"`
}

func run() {
	u := User{Password: "b"}
	p := u.Password
	log.Println("pw:", p)
}
"#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, RuleId::SensitiveVar);
        assert!(findings[0].message.contains("variable \"p\""));
        assert!(findings[0].message.contains("User.Password"));
    }

    #[test]
    fn test_single_valued_return_propagation() {
        let findings = findings_for(
            r#"
package main

import "log/slog"

type User struct {
	Password string `sensitive:"true"`
}

func getPwd(u User) string {
	return u.Password
}

func run() {
	u := User{Password: "b"}
	q := getPwd(u)
	slog.Info("m", q)
	slog.Info("m", getPwd(u))
}
"#,
        );
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].rule, RuleId::SensitiveVar);
        assert_eq!(findings[1].rule, RuleId::SensitiveCall);
        assert!(findings[1]
            .message
            .contains("function call returns sensitive field \"User.Password\""));
    }

    #[test]
    fn test_whole_struct_logging() {
        let findings = findings_for(
            r#"
package main

import (
	"fmt"
	"log/slog"
)

type Config struct {
	Secret string `sensitive:"true"`
	Env    string
}

func run() {
	cfg := Config{Secret: "s", Env: "dev"}
	fmt.Println("c:", cfg)
	slog.Info("c", slog.Any("data", cfg))
}
"#,
        );
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.rule == RuleId::SensitiveStruct));
        assert!(findings.iter().all(|f| f.message.contains("Config")));
    }

    #[test]
    fn test_embedded_struct_sensitivity() {
        let findings = findings_for(
            r#"
package main

import "log/slog"

type Inner struct {
	S string `sensitive:"true"`
}

type Outer struct {
	Inner
	D string
}

func run() {
	o := Outer{}
	slog.Info("o", o)
	slog.Info("s", o.Inner.S)
}
"#,
        );
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].rule, RuleId::SensitiveStruct);
        assert!(findings[0].message.contains("Outer"));
        assert_eq!(findings[1].rule, RuleId::SensitiveField);
        assert!(findings[1].message.contains("Inner.S"));
    }

    #[test]
    fn test_negatives() {
        let findings = findings_for(
            r#"
package main

import (
	"log/slog"

	"example.com/foreignpkg"
)

type User struct {
	Name     string
	Password string `sensitive:"true"`
}

func run() {
	u := User{Name: "a", Password: "b"}
	slog.Info("n", u.Name)
	foreignpkg.Log(u.Password)
}
"#,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_pointer_struct_argument() {
        let findings = findings_for(
            r#"
package main

import "log/slog"

type Config struct {
	Secret string `sensitive:"true"`
}

func run() {
	cfg := &Config{Secret: "s"}
	slog.Info("c", cfg)
	slog.Info("s", cfg.Secret)
}
"#,
        );
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].rule, RuleId::SensitiveStruct);
        assert_eq!(findings[1].rule, RuleId::SensitiveField);
    }

    #[test]
    fn test_wrapper_call_argument_walk() {
        let findings = findings_for(
            r#"
package main

import "log/slog"

type User struct {
	Secret string `sensitive:"true"`
}

func wrap(k string, v string) string {
	return k + v
}

func run(u User) {
	slog.Info("m", wrap("v", u.Secret))
}
"#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, RuleId::SensitiveField);
        assert!(findings[0].message.contains("User.Secret"));
    }

    #[test]
    fn test_determinism() {
        let source = r#"
package main

import "log/slog"

type User struct {
	Password string `sensitive:"true"`
}

func run() {
	u := User{Password: "b"}
	p := u.Password
	slog.Info("a", p)
	slog.Info("b", u.Password)
	slog.Info("c", u)
}
"#;
        let a = findings_for(source);
        let b = findings_for(source);
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        // Findings arrive in sink discovery order.
        assert_eq!(a[0].rule, RuleId::SensitiveVar);
        assert_eq!(a[1].rule, RuleId::SensitiveField);
        assert_eq!(a[2].rule, RuleId::SensitiveStruct);
    }

    #[test]
    fn test_logger_method_sink_with_tainted_var() {
        let findings = findings_for(
            r#"
package main

import "log/slog"

type User struct {
	Password string `sensitive:"true"`
}

func run() {
	u := User{Password: "b"}
	password := u.Password
	logger := slog.Default()
	logger.Info("msg", "pass", password)
}
"#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, RuleId::SensitiveVar);
        assert!(findings[0].message.contains("variable \"password\""));
    }

    #[test]
    fn test_sink_inside_closure() {
        let findings = findings_for(
            r#"
package main

import "log/slog"

type User struct {
	Password string `sensitive:"true"`
}

func run() {
	u := User{Password: "b"}
	go func() {
		slog.Info("m", u.Password)
	}()
}
"#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, RuleId::SensitiveField);
    }
}
