//! Sink recognition: is a call expression a logging invocation?
//!
//! Built-in rules cover the `log/slog`, `log`, and `fmt` packages plus
//! methods on `*slog.Logger` and `*log.Logger`. User configuration adds
//! package-level functions and receiver-matched methods of third-party
//! logging libraries. All variants share the single [`SinkRecognizer::is_sink`]
//! decision surface.

use phf::{phf_set, Set};

use crate::config::Config;
use crate::resolve::{Symbol, SymbolKind, TypeInfo};
use crate::syntax::ast::Expr;

/// Method names of `log/slog` package functions and `*slog.Logger`.
static SLOG_METHODS: Set<&'static str> = phf_set! {
    "Info", "Error", "Warn", "Debug",
    "InfoContext", "ErrorContext", "WarnContext", "DebugContext",
    "Log", "LogAttrs",
};

/// Function names of the standard `log` package and `*log.Logger`.
static LOG_METHODS: Set<&'static str> = phf_set! {
    "Print", "Printf", "Println",
    "Fatal", "Fatalf", "Fatalln",
    "Panic", "Panicf", "Panicln",
    "Output",
};

/// Printing functions of the `fmt` package.
static FMT_FUNCS: Set<&'static str> = phf_set! {
    "Print", "Printf", "Println",
    "Fprint", "Fprintf", "Fprintln",
};

/// Classifies call expressions against the built-in and configured sink
/// rules. Read-only after construction.
pub struct SinkRecognizer<'a> {
    info: &'a TypeInfo,
    config: Option<&'a Config>,
}

impl<'a> SinkRecognizer<'a> {
    pub fn new(info: &'a TypeInfo, config: Option<&'a Config>) -> Self {
        Self { info, config }
    }

    /// Whether `call` is a logging sink. Non-call expressions and calls
    /// whose callee does not resolve through a selector are never sinks.
    pub fn is_sink(&self, call: &Expr) -> bool {
        let Expr::Call { func, .. } = call else {
            return false;
        };
        let Expr::Selector { field, .. } = &**func else {
            return false;
        };
        let Some(sym_id) = self.info.use_of(field.id) else {
            return false;
        };
        let symbol = self.info.symbol(sym_id);
        if symbol.kind != SymbolKind::Func {
            return false;
        }
        let Some(pkg) = symbol.pkg.as_deref() else {
            return false;
        };
        let name = symbol.name.as_str();

        // Built-in package rules.
        match pkg {
            "log/slog" if SLOG_METHODS.contains(name) => return true,
            "log" if LOG_METHODS.contains(name) => return true,
            "fmt" if FMT_FUNCS.contains(name) => return true,
            _ => {}
        }

        // Built-in logger-type methods.
        if let Some(recv) = &symbol.recv {
            if recv.pointer {
                if recv.pkg == "log/slog" && recv.name == "Logger" && SLOG_METHODS.contains(name) {
                    return true;
                }
                if recv.pkg == "log" && recv.name == "Logger" && LOG_METHODS.contains(name) {
                    return true;
                }
            }
        }

        // Configured third-party targets.
        if let Some(config) = self.config {
            return self.is_configured_sink(config, pkg, symbol);
        }

        false
    }

    fn is_configured_sink(&self, config: &Config, pkg: &str, symbol: &Symbol) -> bool {
        for target in &config.targets {
            if target.package != pkg {
                continue;
            }
            if target.functions.iter().any(|f| f == &symbol.name) {
                return true;
            }
            let Some(recv) = &symbol.recv else { continue };
            for method in &target.methods {
                let (want_name, want_pointer) = match method.receiver.strip_prefix('*') {
                    Some(base) => (base, true),
                    None => (method.receiver.as_str(), false),
                };
                if recv.pkg == target.package
                    && recv.name == want_name
                    && recv.pointer == want_pointer
                    && method.names.iter().any(|n| n == &symbol.name)
                {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MethodConfig, TargetConfig};
    use crate::loader::parse_package_from_sources;
    use crate::syntax::ast::{self, Decl};

    /// All sink decisions over every call in the source, in traversal order.
    fn sink_calls(source: &str, config: Option<&Config>) -> Vec<String> {
        let pass = parse_package_from_sources("example.com/demo", &[("main.go", source)]).unwrap();
        let recognizer = SinkRecognizer::new(&pass.info, config);
        let mut out = Vec::new();
        for file in &pass.files {
            for decl in &file.decls {
                let Decl::Func(fd) = decl else { continue };
                let Some(body) = &fd.body else { continue };
                ast::walk_stmts(body, &mut |stmt| {
                    for expr in stmt.top_exprs() {
                        let mut calls = Vec::new();
                        ast::collect_calls(expr, &mut calls);
                        for call in calls {
                            if recognizer.is_sink(call) {
                                if let Expr::Call { func, .. } = call {
                                    if let Expr::Selector { field, .. } = &**func {
                                        out.push(field.name.clone());
                                    }
                                }
                            }
                        }
                    }
                });
            }
        }
        out
    }

    #[test]
    fn test_builtin_package_sinks() {
        let sinks = sink_calls(
            r#"
package main

import (
	"fmt"
	"log"
	"log/slog"
)

func f() {
	slog.Info("m")
	slog.LogAttrs(nil, slog.LevelInfo, "m")
	log.Println("m")
	log.Fatalf("m")
	fmt.Println("m")
	fmt.Fprintf(nil, "m")
	fmt.Sprintf("m")
}
"#,
            None,
        );
        assert_eq!(
            sinks,
            vec!["Info", "LogAttrs", "Println", "Fatalf", "Println", "Fprintf"]
        );
    }

    #[test]
    fn test_logger_method_sinks() {
        let sinks = sink_calls(
            r#"
package main

import (
	"log"
	"log/slog"
)

func f() {
	logger := slog.Default()
	logger.Info("m")
	logger.WarnContext(nil, "m")
	l := log.Default()
	l.Println("m")
}
"#,
            None,
        );
        // slog.Default and log.Default are constructors, not sinks.
        assert_eq!(sinks, vec!["Info", "WarnContext", "Println"]);
    }

    #[test]
    fn test_unresolved_and_foreign_calls_are_not_sinks() {
        let sinks = sink_calls(
            r#"
package main

import "example.com/foreignpkg"

func f() {
	foreignpkg.Log("m")
	helper("m")
}

func helper(s string) {}
"#,
            None,
        );
        assert!(sinks.is_empty());
    }

    #[test]
    fn test_configured_function_sink() {
        let config = Config {
            targets: vec![TargetConfig {
                package: "github.com/rs/zerolog/log".into(),
                functions: vec!["Print".into()],
                methods: vec![],
            }],
        };
        let sinks = sink_calls(
            r#"
package main

import "github.com/rs/zerolog/log"

func f() {
	log.Print("m")
}
"#,
            Some(&config),
        );
        assert_eq!(sinks, vec!["Print"]);
    }

    #[test]
    fn test_configured_method_sink_receiver_match() {
        let config = Config {
            targets: vec![TargetConfig {
                package: "example.com/demo".into(),
                functions: vec![],
                methods: vec![MethodConfig {
                    receiver: "*Logger".into(),
                    names: vec!["Write".into()],
                }],
            }],
        };
        let source = r#"
package main

type Logger struct{}

func (l *Logger) Write(msg string) {}

func (l Logger) Format(msg string) {}

func f() {
	l := &Logger{}
	l.Write("m")
	v := Logger{}
	v.Format("m")
}
"#;
        let sinks = sink_calls(source, Some(&config));
        // Only the pointer-receiver method matches "*Logger".
        assert_eq!(sinks, vec!["Write"]);
    }

    #[test]
    fn test_no_config_means_builtins_only() {
        let sinks = sink_calls(
            r#"
package main

import "github.com/rs/zerolog/log"

func f() {
	log.Print("m")
}
"#,
            None,
        );
        assert!(sinks.is_empty());
    }
}
