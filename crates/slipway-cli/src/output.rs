use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use slipway_core::{ReconcileOutcome, ReconciliationResult};

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Indented detail line under a per-manifest verdict.
pub fn print_detail(msg: &str) {
    println!("    {msg}");
}

pub fn print_batch_summary(results: &[ReconciliationResult]) {
    if results.is_empty() {
        println!("No manifests processed.");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["App", "Outcome", "Domain", "Auto-deploy", "Error"]);
    for result in results {
        let outcome = match result.outcome {
            ReconcileOutcome::Created => "created",
            ReconcileOutcome::Updated => "updated",
            ReconcileOutcome::Failed => "failed",
        };
        let auto_deploy = match result.auto_deploy_configured {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        };
        builder.push_record([
            result.app_name.as_str(),
            outcome,
            result.domain.as_deref().unwrap_or("-"),
            auto_deploy,
            result.error.as_deref().unwrap_or("-"),
        ]);
    }

    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");

    let failed = results.iter().filter(|r| !r.success).count();
    if failed == 0 {
        print_success(&format!("{} manifest(s) converged", results.len()));
    } else {
        print_error(&format!("{failed} of {} manifest(s) failed", results.len()));
    }
}
