use anyhow::Result;

use slipway_core::{Manifest, ReconciliationResult};
use slipway_reconciler::BatchDriver;

use crate::discover::discover;
use crate::output;
use crate::settings::Settings;

/// Admits every manifest, then reconciles the admitted ones sequentially.
/// Admission failures count as batch failures. Returns whether the whole
/// batch converged.
pub async fn run(settings: &Settings, paths: &[String]) -> Result<bool> {
    let files = discover(paths)?;
    let gate = super::gate_from(settings);

    let mut admitted: Vec<Manifest> = Vec::new();
    let mut admission_failures: Vec<ReconciliationResult> = Vec::new();
    for file in &files {
        match gate.admit(&file.document, file.compose.as_ref()) {
            Ok(admission) => {
                for warning in &admission.warnings {
                    output::print_warning(&format!(
                        "{}: {warning}",
                        admission.manifest.name()
                    ));
                }
                admitted.push(admission.manifest);
            }
            Err(err) => {
                output::print_error(&format!("{}: {err}", file.display_name()));
                for line in err.detail_lines() {
                    output::print_detail(&line);
                }
                let name = file.display_name();
                admission_failures.push(ReconciliationResult::failure(
                    &name,
                    &name,
                    err.to_string(),
                ));
            }
        }
    }

    let driver = BatchDriver::new(super::reconciler_from(settings)?);
    let outcome = driver.apply_all(&admitted).await?;

    let mut results = outcome.results;
    results.extend(admission_failures);
    output::print_batch_summary(&results);

    Ok(!results.iter().any(|r| !r.success))
}
