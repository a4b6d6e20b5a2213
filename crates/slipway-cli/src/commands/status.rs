use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;

use slipway_platform::PlatformApi;

use crate::output;
use crate::settings::Settings;

pub async fn run(settings: &Settings) -> Result<bool> {
    let client = super::client_from(settings)?;

    client.ping().await?;
    output::print_success(&format!(
        "platform at {} is reachable",
        settings.platform.base_url
    ));

    let Some(found) = client
        .find_project_by_name(&settings.platform.project)
        .await?
    else {
        println!(
            "Project \"{}\" does not exist yet; it is created on first apply.",
            settings.platform.project
        );
        return Ok(true);
    };

    let project = client.get_project(&found.id).await?;
    let Some(environment) = project.primary_environment() else {
        output::print_error(&format!("project \"{}\" has no environment", project.name));
        return Ok(false);
    };

    let applications = client.list_applications(&project.id, &environment.id).await?;
    if applications.is_empty() {
        println!("No applications deployed.");
        return Ok(true);
    }

    let mut builder = Builder::default();
    builder.push_record(["Name", "Id", "Source", "CPU (m)", "Memory (MB)"]);
    for app in &applications {
        builder.push_record([
            app.name.as_str(),
            app.id.as_str(),
            app.source_type.as_deref().unwrap_or("-"),
            &app.cpu_limit.map_or_else(|| "-".to_string(), |v| v.to_string()),
            &app.memory_limit.map_or_else(|| "-".to_string(), |v| v.to_string()),
        ]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    println!("Total: {}", applications.len());

    Ok(true)
}
