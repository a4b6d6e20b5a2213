use thiserror::Error;

use crate::policy::PolicyViolation;
use crate::schema::SchemaIssue;

/// Admission failures block a manifest before any remote mutation and are
/// fully recoverable by editing the manifest.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("Manifest is not parseable: {0}")]
    Parse(#[from] slipway_core::CoreError),

    #[error("Compose descriptor is not parseable: {0}")]
    ComposeParse(serde_yaml::Error),

    #[error("Schema validation failed with {} issue(s)", issues.len())]
    Schema { issues: Vec<SchemaIssue> },

    #[error("Policy denied the manifest with {} violation(s)", violations.len())]
    Denied { violations: Vec<PolicyViolation> },
}

impl AdmissionError {
    pub fn compose_parse(err: serde_yaml::Error) -> Self {
        Self::ComposeParse(err)
    }

    pub fn schema(issues: Vec<SchemaIssue>) -> Self {
        Self::Schema { issues }
    }

    pub fn denied(violations: Vec<PolicyViolation>) -> Self {
        Self::Denied { violations }
    }

    /// Human-readable detail lines, one per structured issue.
    pub fn detail_lines(&self) -> Vec<String> {
        match self {
            Self::Schema { issues } => issues.iter().map(ToString::to_string).collect(),
            Self::Denied { violations } => violations.iter().map(ToString::to_string).collect(),
            Self::Parse(err) => vec![err.to_string()],
            Self::ComposeParse(err) => vec![err.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DenyRule;

    #[test]
    fn test_schema_error_counts_issues() {
        let err = AdmissionError::schema(vec![
            SchemaIssue {
                path: "metadata.name".into(),
                message: "required string is missing".into(),
            },
            SchemaIssue {
                path: "spec.ports".into(),
                message: "required list is missing".into(),
            },
        ]);
        assert_eq!(err.to_string(), "Schema validation failed with 2 issue(s)");
        assert_eq!(err.detail_lines().len(), 2);
        assert!(err.detail_lines()[0].starts_with("metadata.name:"));
    }

    #[test]
    fn test_denied_error_carries_violations() {
        let err = AdmissionError::denied(vec![PolicyViolation {
            rule: DenyRule::ReservedName,
            message: "name \"admin\" is reserved".into(),
        }]);
        assert_eq!(err.to_string(), "Policy denied the manifest with 1 violation(s)");
        assert_eq!(err.detail_lines(), vec!["name \"admin\" is reserved"]);
    }
}
