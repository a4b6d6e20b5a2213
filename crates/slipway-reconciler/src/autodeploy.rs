//! Boundary to the CI bootstrap that installs auto-deploy workflows in
//! source repositories. The bootstrap itself lives outside the core; the
//! reconciler only decides eligibility and degrades gracefully.

use async_trait::async_trait;

use slipway_core::manifest::GithubSource;

/// Installs a CI secret and workflow that calls the platform's redeploy
/// endpoint on push.
#[async_trait]
pub trait AutoDeployInstaller: Send + Sync {
    async fn install(&self, source: &GithubSource, application_id: &str) -> anyhow::Result<()>;
}

/// Installer that declines every request; used when no CI credentials are
/// configured.
#[derive(Debug, Default)]
pub struct DisabledAutoDeploy;

#[async_trait]
impl AutoDeployInstaller for DisabledAutoDeploy {
    async fn install(&self, _source: &GithubSource, _application_id: &str) -> anyhow::Result<()> {
        anyhow::bail!("auto-deploy provisioning is not configured")
    }
}
