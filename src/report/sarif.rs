//! SARIF (Static Analysis Results Interchange Format) 2.1.0 output.
//!
//! One document per run, aggregating the findings of every analyzed
//! package. Rule ids are mapped to the `LH0001`–`LH0004` descriptors and
//! each result carries a stable `primaryLocationLineHash` fingerprint so
//! CI platforms can track an issue across runs.
//!
//! Specification: <https://docs.oasis-open.org/sarif/sarif/v2.1.0/sarif-v2.1.0.html>

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ReportedFinding;
use crate::detector::RuleId;
use crate::error::Result;

const SCHEMA_URI: &str =
    "https://docs.oasis-open.org/sarif/sarif/v2.1.0/errata01/os/schemas/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "leakhound";
const TOOL_FULL_NAME: &str = "LeakHound Sensitive Data Detector";
const INFORMATION_URI: &str = "https://github.com/leakhound/leakhound-rs";
const AUTOMATION_ID: &str = "leakhound/analysis";

/// Tool version embedded in the document.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// SARIF Types (v2.1.0)
// =============================================================================

/// The root SARIF document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub tool: Tool,
    pub results: Vec<SarifResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automation_details: Option<AutomationDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub driver: Driver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub information_uri: String,
    pub version: String,
    pub semantic_version: String,
    pub rules: Vec<ReportingDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingDescriptor {
    pub id: String,
    pub name: String,
    pub short_description: MessageString,
    pub full_description: MessageString,
    pub help: MessageString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_uri: Option<String>,
    pub default_configuration: Configuration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageString {
    pub text: String,
}

impl MessageString {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub message: MessageString,
    pub locations: Vec<Location>,
    pub level: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub partial_fingerprints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub physical_location: PhysicalLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocation {
    pub artifact_location: ArtifactLocation,
    pub region: Region,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactLocation {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri_base_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub start_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
}

// =============================================================================
// Document construction
// =============================================================================

/// Build the SARIF document for a set of findings.
#[must_use]
pub fn build_document(findings: &[ReportedFinding]) -> Document {
    let results = findings.iter().map(build_result).collect();
    Document {
        version: "2.1.0".to_string(),
        schema: SCHEMA_URI.to_string(),
        runs: vec![Run {
            tool: build_tool(),
            results,
            automation_details: Some(AutomationDetails {
                id: Some(AUTOMATION_ID.to_string()),
            }),
        }],
    }
}

/// Serialize findings as pretty-printed SARIF JSON.
pub fn write(out: &mut dyn std::io::Write, findings: &[ReportedFinding]) -> Result<()> {
    let doc = build_document(findings);
    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)?;
    Ok(())
}

fn build_tool() -> Tool {
    let version = if VERSION.is_empty() { "dev" } else { VERSION };
    Tool {
        driver: Driver {
            name: TOOL_NAME.to_string(),
            full_name: Some(TOOL_FULL_NAME.to_string()),
            information_uri: INFORMATION_URI.to_string(),
            version: version.to_string(),
            semantic_version: version.to_string(),
            rules: build_rules(),
        },
    }
}

fn build_result(finding: &ReportedFinding) -> SarifResult {
    let sarif_rule = finding.rule.sarif_id();
    let mut partial_fingerprints = BTreeMap::new();
    partial_fingerprints.insert(
        "primaryLocationLineHash".to_string(),
        fingerprint(&finding.path, finding.line, sarif_rule),
    );

    SarifResult {
        rule_id: sarif_rule.to_string(),
        message: MessageString::new(&finding.message),
        locations: vec![Location {
            physical_location: PhysicalLocation {
                artifact_location: ArtifactLocation {
                    uri: finding.path.clone(),
                    uri_base_id: Some("%SRCROOT%".to_string()),
                },
                region: Region {
                    start_line: finding.line,
                    start_column: Some(finding.column),
                },
            },
        }],
        level: "error".to_string(),
        partial_fingerprints,
    }
}

/// Stable fingerprint: the first 128 bits of SHA-256 over
/// `"<path>:<line>:<sarif rule id>"`, hex-encoded. The same issue at the
/// same location keeps the same fingerprint across runs.
fn fingerprint(path: &str, line: u32, rule_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{path}:{line}:{rule_id}").as_bytes());
    let digest = hasher.finalize();
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

/// Rule descriptors for every rule the analyzer can emit.
#[must_use]
pub fn build_rules() -> Vec<ReportingDescriptor> {
    RuleId::ALL
        .iter()
        .map(|&rule| {
            let (short, full, help) = rule_texts(rule);
            ReportingDescriptor {
                id: rule.sarif_id().to_string(),
                name: rule.sarif_name().to_string(),
                short_description: MessageString::new(short),
                full_description: MessageString::new(full),
                help: MessageString::new(help),
                help_uri: Some(format!("{INFORMATION_URI}#{}", rule.sarif_id())),
                default_configuration: Configuration {
                    level: "error".to_string(),
                },
            }
        })
        .collect()
}

fn rule_texts(rule: RuleId) -> (&'static str, &'static str, &'static str) {
    match rule {
        RuleId::SensitiveVar => (
            "Variable containing sensitive data is logged",
            "A variable that contains data from a field tagged with sensitive:\"true\" is passed to a logging function.",
            "Avoid logging variables that contain sensitive information. Consider redacting or removing the sensitive data before logging.",
        ),
        RuleId::SensitiveCall => (
            "Function call returning sensitive data is logged",
            "A function call that returns sensitive data (from a field tagged with sensitive:\"true\") is passed to a logging function.",
            "Avoid logging function return values that contain sensitive information. Store the result in a variable and redact sensitive fields before logging.",
        ),
        RuleId::SensitiveStruct => (
            "Struct containing sensitive fields is logged",
            "An entire struct that contains fields tagged with sensitive:\"true\" is passed to a logging function.",
            "Avoid logging entire structs that contain sensitive fields. Log only the non-sensitive fields individually.",
        ),
        RuleId::SensitiveField => (
            "Sensitive struct field is logged",
            "A struct field tagged with sensitive:\"true\" is directly accessed and passed to a logging function.",
            "Avoid logging fields marked as sensitive. Remove the field from the log call or redact its value.",
        ),
    }
}
