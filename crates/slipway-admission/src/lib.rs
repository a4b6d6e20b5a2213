pub mod compose;
pub mod error;
pub mod policy;
pub mod registry;
pub mod schema;

pub use compose::{ComposeDescriptor, ComposeService};
pub use error::AdmissionError;
pub use policy::{
    DANGEROUS_CAPABILITIES, DenyRule, PolicyEngine, PolicyReport, PolicyViolation, PolicyWarning,
    WarnRule,
};
pub use registry::SubdomainRegistry;
pub use schema::{SchemaIssue, SchemaValidator};

use slipway_core::Manifest;

/// A manifest that passed the full gate, plus the warnings it picked up.
#[derive(Debug, Clone)]
pub struct Admitted {
    pub manifest: Manifest,
    pub warnings: Vec<PolicyWarning>,
}

/// The combined admission gate: schema -> typed parse -> policy + registry.
///
/// Deciding admissibility happens entirely before any external mutation; a
/// rejected manifest never reaches the reconciler.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    schema: SchemaValidator,
    policy: PolicyEngine,
}

impl AdmissionGate {
    pub fn new(domain_suffix: impl Into<String>, registry: SubdomainRegistry) -> Self {
        Self {
            schema: SchemaValidator::new(domain_suffix),
            policy: PolicyEngine::new(registry),
        }
    }

    /// Runs the full gate over one raw manifest document.
    pub fn admit(
        &self,
        document: &str,
        compose: Option<&ComposeDescriptor>,
    ) -> Result<Admitted, AdmissionError> {
        let raw: serde_yaml::Value =
            serde_yaml::from_str(document).map_err(slipway_core::CoreError::from)?;

        let issues = self.schema.validate(&raw);
        if !issues.is_empty() {
            tracing::debug!(issues = issues.len(), "manifest failed schema validation");
            return Err(AdmissionError::schema(issues));
        }

        let manifest = Manifest::from_yaml(document)?;

        let report = self.policy.evaluate(&manifest, compose);
        if !report.is_admissible() {
            tracing::debug!(
                app = manifest.name(),
                violations = report.deny.len(),
                "manifest denied by policy"
            );
            return Err(AdmissionError::denied(report.deny));
        }

        Ok(Admitted {
            manifest,
            warnings: report.warn,
        })
    }
}
