//! Findings: one reported leak instance.

use serde::Serialize;

use crate::syntax::Pos;

/// Stable rule identifiers for the four leak shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    /// A tainted variable is passed to a sink.
    SensitiveVar,
    /// A call returning tainted data is passed to a sink.
    SensitiveCall,
    /// A whole struct containing sensitive fields is passed to a sink.
    SensitiveStruct,
    /// A sensitive field is accessed inside a sink argument.
    SensitiveField,
}

impl RuleId {
    /// The analyzer-facing rule id.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleId::SensitiveVar => "sensitive-var",
            RuleId::SensitiveCall => "sensitive-call",
            RuleId::SensitiveStruct => "sensitive-struct",
            RuleId::SensitiveField => "sensitive-field",
        }
    }

    /// The SARIF rule id (`LH` prefix + numeric code).
    pub fn sarif_id(self) -> &'static str {
        match self {
            RuleId::SensitiveVar => "LH0001",
            RuleId::SensitiveCall => "LH0002",
            RuleId::SensitiveStruct => "LH0003",
            RuleId::SensitiveField => "LH0004",
        }
    }

    /// The SARIF rule name.
    pub fn sarif_name(self) -> &'static str {
        match self {
            RuleId::SensitiveVar => "SensitiveVariableLogged",
            RuleId::SensitiveCall => "SensitiveFunctionCallLogged",
            RuleId::SensitiveStruct => "SensitiveStructLogged",
            RuleId::SensitiveField => "SensitiveFieldLogged",
        }
    }

    pub const ALL: [RuleId; 4] = [
        RuleId::SensitiveVar,
        RuleId::SensitiveCall,
        RuleId::SensitiveStruct,
        RuleId::SensitiveField,
    ];
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected sensitive data leak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub pos: Pos,
    pub message: String,
    pub rule: RuleId,
}

impl Finding {
    pub fn new(pos: Pos, rule: RuleId, message: impl Into<String>) -> Self {
        Self {
            pos,
            message: message.into(),
            rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_id_mapping() {
        assert_eq!(RuleId::SensitiveVar.as_str(), "sensitive-var");
        assert_eq!(RuleId::SensitiveVar.sarif_id(), "LH0001");
        assert_eq!(RuleId::SensitiveCall.sarif_id(), "LH0002");
        assert_eq!(RuleId::SensitiveStruct.sarif_id(), "LH0003");
        assert_eq!(RuleId::SensitiveField.sarif_id(), "LH0004");
        assert_eq!(RuleId::SensitiveField.sarif_name(), "SensitiveFieldLogged");
    }
}
