use anyhow::Result;

use slipway_core::RemovalOutcome;

use crate::output;
use crate::settings::Settings;

pub async fn run(settings: &Settings, name: &str) -> Result<bool> {
    let reconciler = super::reconciler_from(settings)?;
    let result = reconciler.remove(name).await;

    match result.outcome {
        RemovalOutcome::Deleted => {
            output::print_success(&format!("{name} deleted"));
            Ok(true)
        }
        RemovalOutcome::Absent => {
            output::print_success(&format!("{name} was already absent"));
            Ok(true)
        }
        RemovalOutcome::Failed => {
            output::print_error(&format!(
                "{name}: {}",
                result.error.as_deref().unwrap_or("removal failed")
            ));
            Ok(false)
        }
    }
}
