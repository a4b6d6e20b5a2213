use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable carrying the platform API token. The token never
/// lives in the settings file.
pub const TOKEN_ENV: &str = "SLIPWAY_PLATFORM_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub platform: PlatformSettings,
    #[serde(default)]
    pub domain: DomainSettings,
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub sources: SourceSettings,
    #[serde(default)]
    pub autodeploy: AutoDeploySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSettings {
    /// Base URL of the control plane API.
    pub base_url: String,
    /// Name of the single shared multi-tenant project.
    #[serde(default = "PlatformSettings::default_project")]
    pub project: String,
}

impl PlatformSettings {
    fn default_project() -> String {
        "shared".to_string()
    }
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            project: Self::default_project(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DomainSettings {
    /// Managed domain suffix, e.g. `apps.example.com`.
    #[serde(default)]
    pub suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistrySettings {
    #[serde(default)]
    pub reserved: Vec<String>,
    #[serde(default)]
    pub blocked_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceSettings {
    /// Owners with the organization-scoped integration identity installed.
    #[serde(default)]
    pub github_app_owners: Vec<String>,
    /// Owners with an organization-scoped deploy key registered.
    #[serde(default)]
    pub deploy_key_owners: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AutoDeploySettings {
    /// Owners eligible for best-effort auto-deploy provisioning.
    #[serde(default)]
    pub allowed_owners: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "LoggingSettings::default_level")]
    pub level: String,
}

impl LoggingSettings {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read settings file {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Cannot parse settings file {}", path.display()))?;
        settings
            .validate()
            .map_err(|msg| anyhow::anyhow!("Invalid settings: {msg}"))?;
        Ok(settings)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.platform.base_url.is_empty() {
            return Err("platform.base_url must be set".into());
        }
        if url::Url::parse(&self.platform.base_url).is_err() {
            return Err(format!(
                "platform.base_url \"{}\" is not a valid URL",
                self.platform.base_url
            ));
        }
        if self.platform.project.trim().is_empty() {
            return Err("platform.project must not be empty".into());
        }
        if self.domain.suffix.trim().is_empty() {
            return Err("domain.suffix must be set".into());
        }
        if self.domain.suffix.starts_with('.') {
            return Err("domain.suffix must not start with '.'".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        Ok(())
    }

    /// The platform token, read from the process environment only.
    pub fn platform_token(&self) -> Result<String> {
        std::env::var(TOKEN_ENV)
            .with_context(|| format!("{TOKEN_ENV} is not set; export the platform API token"))
    }
}
