use std::sync::Arc;

use slipway_core::domain::derive_host;
use slipway_core::manifest::{Manifest, Source};
use slipway_core::{ReconcileOutcome, ReconciliationResult, RemovalResult};
use slipway_platform::{
    ApplicationUpdate, BuildConfig, DeployKeyProvider, DockerProvider, DomainSpec,
    GithubAppProvider, PlatformApi, PublicGitProvider, RemoteApplication, RemoteEnvironment,
    RemoteProject,
};

use crate::autodeploy::AutoDeployInstaller;
use crate::envvars::resolve_environment;
use crate::error::ReconcileError;
use crate::settings::{ReconcilerSettings, SecretStore};
use crate::source::{SourceStrategy, select_strategy};

/// Fixed title of the first deployment of an application.
pub const INITIAL_DEPLOY_TITLE: &str = "Initial deployment via Slipway";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// The idempotent sync engine. Re-runnable on identical or updated input:
/// every step except project creation is individually convergent, so a run
/// aborted halfway is repaired by the next one.
pub struct Reconciler {
    platform: Arc<dyn PlatformApi>,
    settings: ReconcilerSettings,
    secrets: SecretStore,
    auto_deploy: Option<Arc<dyn AutoDeployInstaller>>,
}

impl Reconciler {
    pub fn new(
        platform: Arc<dyn PlatformApi>,
        settings: ReconcilerSettings,
        secrets: SecretStore,
    ) -> Self {
        Self {
            platform,
            settings,
            secrets,
            auto_deploy: None,
        }
    }

    pub fn with_auto_deploy(mut self, installer: Arc<dyn AutoDeployInstaller>) -> Self {
        self.auto_deploy = Some(installer);
        self
    }

    pub(crate) fn platform(&self) -> &Arc<dyn PlatformApi> {
        &self.platform
    }

    /// Converges remote state to one manifest. Never returns `Err`: every
    /// outcome, including remote failures, becomes exactly one result
    /// record.
    pub async fn reconcile(&self, manifest: &Manifest) -> ReconciliationResult {
        let name = manifest.name();
        tracing::info!(app = name, "reconciling manifest");
        match self.converge(manifest).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(app = name, error = %err, "reconciliation failed");
                ReconciliationResult::failure(name, name, err.to_string())
            }
        }
    }

    async fn converge(
        &self,
        manifest: &Manifest,
    ) -> Result<ReconciliationResult, ReconcileError> {
        let name = manifest.name();
        let port = manifest
            .primary_port()
            .ok_or_else(|| ReconcileError::MissingPort {
                name: name.to_string(),
            })?;
        let mut warnings = Vec::new();

        // Step 1: resolve the shared project and its single environment.
        let (project, environment) = self.resolve_project().await?;

        // Step 2: resolve the target application by exact name.
        let (app, mode) = self.resolve_application(&project, &environment, name).await?;
        tracing::debug!(app = name, id = %app.id, mode = ?mode, "resolved application");

        // Step 3: source configuration.
        self.configure_source(&app.id, manifest).await?;

        // Step 4: build configuration. Docker images skip the build.
        if let Some(build) = manifest.effective_build() {
            self.platform
                .save_build_config(
                    &app.id,
                    &BuildConfig {
                        build_type: build.build_type,
                        dockerfile: build.dockerfile,
                        context: build.context,
                        stage: build.stage,
                    },
                )
                .await?;
        }

        // Step 5: resource quota, applied unconditionally (cheap and
        // idempotent).
        let quota = manifest.spec.resources.size.quota();
        self.platform
            .update_application(
                &app.id,
                &ApplicationUpdate::quota(quota.cpu_millicores, quota.memory_mb),
            )
            .await?;

        // Step 6: environment variables and secrets.
        if let Some(env) = &manifest.spec.env {
            let resolved = resolve_environment(env, &self.secrets);
            warnings.extend(resolved.warnings);
            self.platform.save_environment(&app.id, &resolved.blob).await?;
        }

        // Step 7: the derived domain. The host is pinned to metadata.name
        // for the application's lifetime.
        let host = derive_host(name, &self.settings.domain_suffix);
        self.reconcile_domain(&app.id, &host, port, mode).await?;

        // Step 8: trigger the deployment.
        match mode {
            Mode::Create => self.platform.deploy(&app.id, INITIAL_DEPLOY_TITLE).await?,
            Mode::Update => self.platform.redeploy(&app.id).await?,
        }

        // Step 9: best-effort auto-deploy provisioning.
        let auto_deploy = self
            .provision_auto_deploy(manifest, &app.id, &mut warnings)
            .await;

        let outcome = match mode {
            Mode::Create => ReconcileOutcome::Created,
            Mode::Update => ReconcileOutcome::Updated,
        };
        let mut result = ReconciliationResult::success(
            name,
            name,
            outcome,
            app.id,
            format!("https://{host}"),
        )
        .with_warnings(warnings);
        if let Some(configured) = auto_deploy {
            result = result.with_auto_deploy(configured);
        }
        Ok(result)
    }

    /// Find-or-create of the shared project. Not atomic against the remote
    /// API: a concurrent second run may race into a duplicate create;
    /// find-by-name idempotency stands in for locking.
    async fn resolve_project(
        &self,
    ) -> Result<(RemoteProject, RemoteEnvironment), ReconcileError> {
        if let Some(found) = self
            .platform
            .find_project_by_name(&self.settings.project_name)
            .await?
        {
            let project = self.platform.get_project(&found.id).await?;
            let environment = project
                .primary_environment()
                .cloned()
                .ok_or_else(|| ReconcileError::EnvironmentMissing {
                    project: project.name.clone(),
                })?;
            return Ok((project, environment));
        }

        tracing::info!(project = %self.settings.project_name, "creating shared project");
        let created = self
            .platform
            .create_project(&self.settings.project_name)
            .await?;
        Ok((created.project, created.environment))
    }

    async fn resolve_application(
        &self,
        project: &RemoteProject,
        environment: &RemoteEnvironment,
        name: &str,
    ) -> Result<(RemoteApplication, Mode), ReconcileError> {
        let applications = self
            .platform
            .list_applications(&project.id, &environment.id)
            .await?;
        let mut matches: Vec<RemoteApplication> = applications
            .into_iter()
            .filter(|app| app.name == name)
            .collect();

        match matches.len() {
            0 => {
                let app = self
                    .platform
                    .create_application(&project.id, &environment.id, name)
                    .await?;
                Ok((app, Mode::Create))
            }
            1 => Ok((matches.remove(0), Mode::Update)),
            count => Err(ReconcileError::ambiguity(name, count)),
        }
    }

    async fn configure_source(
        &self,
        app_id: &str,
        manifest: &Manifest,
    ) -> Result<(), ReconcileError> {
        match &manifest.spec.source {
            Source::Docker(docker) => {
                self.platform
                    .save_docker_source(
                        app_id,
                        &DockerProvider {
                            image: docker.image_ref(),
                        },
                    )
                    .await?;
            }
            Source::Github(github) => match select_strategy(github, &self.settings) {
                SourceStrategy::GithubApp => {
                    self.platform
                        .save_github_app_source(
                            app_id,
                            &GithubAppProvider {
                                owner: github.owner.clone(),
                                repo: github.repo.clone(),
                                branch: github.branch.clone(),
                                path: github.path.clone(),
                            },
                        )
                        .await?;
                }
                SourceStrategy::DeployKey => {
                    self.platform
                        .save_deploy_key_source(
                            app_id,
                            &DeployKeyProvider {
                                owner: github.owner.clone(),
                                repo: github.repo.clone(),
                                branch: github.branch.clone(),
                                path: github.path.clone(),
                            },
                        )
                        .await?;
                }
                SourceStrategy::PublicGit => {
                    self.platform
                        .save_public_git_source(
                            app_id,
                            &PublicGitProvider {
                                repository_url: format!(
                                    "https://github.com/{}/{}.git",
                                    github.owner, github.repo
                                ),
                                branch: github.branch.clone(),
                                path: github.path.clone(),
                            },
                        )
                        .await?;
                }
            },
        }
        Ok(())
    }

    async fn reconcile_domain(
        &self,
        app_id: &str,
        host: &str,
        port: u16,
        mode: Mode,
    ) -> Result<(), ReconcileError> {
        let spec = DomainSpec {
            host: host.to_string(),
            port,
        };

        if mode == Mode::Create {
            self.platform.create_domain(app_id, &spec).await?;
            return Ok(());
        }

        let domains = self.platform.list_domains(app_id).await?;
        match domains.into_iter().find(|d| d.host == host) {
            Some(existing) if existing.port != port => {
                tracing::info!(
                    host,
                    from = existing.port,
                    to = port,
                    "updating drifted domain port"
                );
                self.platform.update_domain(&existing.id, &spec).await?;
            }
            Some(_) => {}
            None => {
                self.platform.create_domain(app_id, &spec).await?;
            }
        }
        Ok(())
    }

    async fn provision_auto_deploy(
        &self,
        manifest: &Manifest,
        app_id: &str,
        warnings: &mut Vec<String>,
    ) -> Option<bool> {
        let Source::Github(github) = &manifest.spec.source else {
            return None;
        };
        if !self.settings.allows_auto_deploy(&github.owner) {
            return None;
        }
        let Some(installer) = &self.auto_deploy else {
            warnings.push("auto-deploy eligible but no installer is configured".to_string());
            return Some(false);
        };

        match installer.install(github, app_id).await {
            Ok(()) => Some(true),
            Err(err) => {
                tracing::warn!(
                    app = manifest.name(),
                    error = %err,
                    "auto-deploy provisioning failed; continuing without it"
                );
                warnings.push(format!("auto-deploy provisioning failed: {err}"));
                Some(false)
            }
        }
    }

    /// Removal reconciliation. Absence is success: the desired state
    /// (no application) already holds.
    pub async fn remove(&self, name: &str) -> RemovalResult {
        match self.try_remove(name).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(app = name, error = %err, "removal failed");
                RemovalResult::failed(name, err.to_string())
            }
        }
    }

    async fn try_remove(&self, name: &str) -> Result<RemovalResult, ReconcileError> {
        let Some(found) = self
            .platform
            .find_project_by_name(&self.settings.project_name)
            .await?
        else {
            return Ok(RemovalResult::absent(name));
        };
        let project = self.platform.get_project(&found.id).await?;
        let Some(environment) = project.primary_environment().cloned() else {
            return Ok(RemovalResult::absent(name));
        };

        let applications = self
            .platform
            .list_applications(&project.id, &environment.id)
            .await?;
        let matches: Vec<&RemoteApplication> = applications
            .iter()
            .filter(|app| app.name == name)
            .collect();

        match matches.len() {
            0 => Ok(RemovalResult::absent(name)),
            1 => {
                // The control plane cascades the domain and deploy history.
                self.platform.delete_application(&matches[0].id).await?;
                tracing::info!(app = name, "deleted remote application");
                Ok(RemovalResult::deleted(name))
            }
            count => Err(ReconcileError::ambiguity(name, count)),
        }
    }
}
