use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "slipway")]
#[command(about = "Slipway — provision application workloads from declarative manifests")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the settings file
    #[arg(
        short,
        long,
        global = true,
        env = "SLIPWAY_CONFIG",
        default_value = "slipway.toml"
    )]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the admission gate over manifests without touching the platform
    Validate(ValidateArgs),
    /// Admit and reconcile manifests onto the platform
    Apply(ApplyArgs),
    /// Remove an application from the platform
    Remove(RemoveArgs),
    /// Probe the platform and list managed applications
    Status,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Manifest files or directories of *.yaml manifests
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// Manifest files or directories of *.yaml manifests
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(clap::Args)]
pub struct RemoveArgs {
    /// Application name (the manifest's metadata.name)
    pub name: String,
}
