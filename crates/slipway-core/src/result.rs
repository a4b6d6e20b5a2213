use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// How a single reconciliation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileOutcome {
    Created,
    Updated,
    Failed,
}

/// One record per processed manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub success: bool,
    pub outcome: ReconcileOutcome,
    #[serde(rename = "appName")]
    pub app_name: String,
    pub subdomain: String,
    #[serde(rename = "applicationId", skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "autoDeployConfigured", skip_serializing_if = "Option::is_none")]
    pub auto_deploy_configured: Option<bool>,
    /// Soft warnings surfaced during the run; these never fail a manifest.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
    #[serde(rename = "finishedAt", with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
}

impl ReconciliationResult {
    pub fn success(
        app_name: impl Into<String>,
        subdomain: impl Into<String>,
        outcome: ReconcileOutcome,
        application_id: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            outcome,
            app_name: app_name.into(),
            subdomain: subdomain.into(),
            application_id: Some(application_id.into()),
            domain: Some(domain.into()),
            error: None,
            auto_deploy_configured: None,
            warnings: Vec::new(),
            finished_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn failure(
        app_name: impl Into<String>,
        subdomain: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            outcome: ReconcileOutcome::Failed,
            app_name: app_name.into(),
            subdomain: subdomain.into(),
            application_id: None,
            domain: None,
            error: Some(error.into()),
            auto_deploy_configured: None,
            warnings: Vec::new(),
            finished_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn with_auto_deploy(mut self, configured: bool) -> Self {
        self.auto_deploy_configured = Some(configured);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// How a removal reconciliation ended. Absence is convergence, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalOutcome {
    Deleted,
    Absent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalResult {
    #[serde(rename = "appName")]
    pub app_name: String,
    pub outcome: RemovalOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemovalResult {
    pub fn deleted(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            outcome: RemovalOutcome::Deleted,
            error: None,
        }
    }

    pub fn absent(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            outcome: RemovalOutcome::Absent,
            error: None,
        }
    }

    pub fn failed(app_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            outcome: RemovalOutcome::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, RemovalOutcome::Failed)
    }
}

/// Aggregate of a sequential batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub results: Vec<ReconciliationResult>,
}

impl BatchOutcome {
    pub fn push(&mut self, result: ReconciliationResult) {
        self.results.push(result);
    }

    /// Drives the non-zero process exit status for review gating.
    pub fn any_failed(&self) -> bool {
        self.results.iter().any(|r| !r.success)
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }
}
