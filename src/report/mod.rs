//! Reporters: serialize findings to human-readable text or SARIF 2.1.0.
//!
//! The core hands back [`crate::detector::Finding`] values positioned
//! inside per-package file sets; the driver flattens them into
//! [`ReportedFinding`]s (path + line + column) before reporting, so the
//! reporters stay independent of the analysis internals.

pub mod sarif;
pub mod text;

use serde::Serialize;

use crate::detector::RuleId;

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Sarif,
}

/// A finding resolved to a printable location. `path` should be relative
/// to the working directory for stable SARIF fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedFinding {
    pub path: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub rule: RuleId,
}

/// Render findings in the requested format.
///
/// # Errors
/// Fails only on serialization or write errors.
pub fn write_findings(
    out: &mut dyn std::io::Write,
    format: Format,
    findings: &[ReportedFinding],
) -> crate::error::Result<()> {
    match format {
        Format::Text => text::write(out, findings),
        Format::Sarif => sarif::write(out, findings),
    }
}
