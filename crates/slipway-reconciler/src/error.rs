use thiserror::Error;

use slipway_platform::PlatformError;

/// Errors that abort one manifest's reconciliation run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// More than one remote application matches a name expected to be
    /// unique. Never auto-resolved: either candidate may be in active use,
    /// so this requires manual remote cleanup.
    #[error(
        "Ambiguous application name \"{name}\": {count} remote applications share it; manual cleanup required"
    )]
    Ambiguity { name: String, count: usize },

    #[error("Manifest \"{name}\" declares no container port")]
    MissingPort { name: String },

    #[error("Project \"{project}\" has no environment")]
    EnvironmentMissing { project: String },

    /// A remote call failed. Prior side effects of this run stand
    /// uncompensated; the next run repairs divergence because every step
    /// is individually convergent.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl ReconcileError {
    pub fn ambiguity(name: impl Into<String>, count: usize) -> Self {
        Self::Ambiguity {
            name: name.into(),
            count,
        }
    }

    /// Whether a later run can succeed without manual intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Platform(_))
    }
}
