//! leakhound - find sensitive struct fields leaking into Go logging calls.
//!
//! The analyzer parses Go packages, tracks how values derived from fields
//! tagged `sensitive:"true"` flow through assignments, returns, and
//! same-package calls, and reports every place such a value reaches a
//! logging sink.
//!
//! # Architecture
//!
//! The pipeline is layered, leaves first:
//!
//! - **Syntax layer** ([`syntax`]): tree-sitter based Go parsing into an
//!   owned AST subset with stable node ids and positions.
//! - **Resolution layer** ([`resolve`]): interned symbols, definition/use
//!   sites, best-effort expression typing, and the cross-package struct
//!   universe.
//! - **Detector** ([`detector`]): the two-phase analysis core — field
//!   catalog, sink recognizer, function registry, taint tracker, sink
//!   collector, and leak detector.
//! - **Driver** ([`loader`], [`config`], [`report`]): package loading,
//!   YAML sink configuration, and text/SARIF reporting.
//!
//! # Quick Start
//!
//! ```no_run
//! use leakhound::{config, detector, loader};
//!
//! let cfg = config::load(None)?;
//! let passes = loader::load_packages(&["./...".to_string()])?;
//! for pass in &passes {
//!     for finding in detector::analyze(pass, Some(&cfg))? {
//!         println!("{}: {}", pass.fset.display(finding.pos), finding.message);
//!     }
//! }
//! # Ok::<(), leakhound::HoundError>(())
//! ```
//!
//! # Analysis model
//!
//! Each package gets its own independent [`Pass`] and fact tables; there
//! is no shared mutable state between package analyses, so the driver is
//! free to run them in parallel. Findings come back in a deterministic
//! order: sink discovery order, then argument index, then the
//! left-to-right walk of the argument.

pub mod config;
pub mod detector;
pub mod error;
pub mod loader;
pub mod report;
pub mod resolve;
pub mod syntax;

use std::sync::Arc;

pub use error::{HoundError, Result};

/// Everything the core needs to analyze one package: the parsed files,
/// the resolved type information, the package identity, and the struct
/// universe shared across loaded packages. The pass is read-only input
/// to [`detector::analyze`].
pub struct Pass {
    pub fset: syntax::FileSet,
    pub files: Vec<syntax::ast::File>,
    /// Import path of the analyzed package; taint never follows callees
    /// declared elsewhere.
    pub pkg: String,
    pub info: resolve::TypeInfo,
    pub universe: Arc<resolve::TypeUniverse>,
}
