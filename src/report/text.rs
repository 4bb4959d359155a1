//! Text output: one `file:line:col: message` line per finding, sorted by
//! position.

use super::ReportedFinding;
use crate::error::Result;

pub fn write(out: &mut dyn std::io::Write, findings: &[ReportedFinding]) -> Result<()> {
    let mut sorted: Vec<&ReportedFinding> = findings.iter().collect();
    sorted.sort_by(|a, b| {
        (a.path.as_str(), a.line, a.column).cmp(&(b.path.as_str(), b.line, b.column))
    });
    for finding in sorted {
        writeln!(
            out,
            "{}:{}:{}: {}",
            finding.path, finding.line, finding.column, finding.message
        )?;
    }
    Ok(())
}
