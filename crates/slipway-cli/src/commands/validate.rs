use anyhow::Result;

use crate::discover::discover;
use crate::output;
use crate::settings::Settings;

/// Runs the admission gate only; nothing remote is touched. Returns
/// whether every manifest passed.
pub fn run(settings: &Settings, paths: &[String]) -> Result<bool> {
    let files = discover(paths)?;
    let gate = super::gate_from(settings);

    let mut all_ok = true;
    for file in &files {
        match gate.admit(&file.document, file.compose.as_ref()) {
            Ok(admitted) => {
                output::print_success(&format!("{} admitted", admitted.manifest.name()));
                for warning in &admitted.warnings {
                    output::print_warning(&warning.to_string());
                }
            }
            Err(err) => {
                all_ok = false;
                output::print_error(&format!("{}: {err}", file.display_name()));
                for line in err.detail_lines() {
                    output::print_detail(&line);
                }
            }
        }
    }
    Ok(all_ok)
}
