use slipway_core::{BatchOutcome, Manifest};

use crate::error::ReconcileError;
use crate::reconciler::Reconciler;

/// Drives a batch of admitted manifests through the reconciler.
///
/// Strictly sequential: parallel reconciliation would race on shared
/// project resolution. One manifest's failure never blocks attempting the
/// rest; the overall exit status is failure if any manifest failed.
pub struct BatchDriver {
    reconciler: Reconciler,
}

impl BatchDriver {
    pub fn new(reconciler: Reconciler) -> Self {
        Self { reconciler }
    }

    /// Probes the control plane once, then reconciles every manifest in
    /// order. `Err` only when the liveness probe fails and the batch never
    /// starts.
    pub async fn apply_all(&self, manifests: &[Manifest]) -> Result<BatchOutcome, ReconcileError> {
        self.reconciler.platform().ping().await?;
        tracing::info!(count = manifests.len(), "starting batch reconciliation");

        let mut outcome = BatchOutcome::default();
        for manifest in manifests {
            outcome.push(self.reconciler.reconcile(manifest).await);
        }

        tracing::info!(
            total = outcome.results.len(),
            failed = outcome.failed_count(),
            "batch reconciliation finished"
        );
        Ok(outcome)
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }
}
