//! In-memory [`PlatformApi`] implementation.
//!
//! Backs the reconciler's integration tests: state lives in a single
//! `RwLock`, ids are uuids, and every mutating call is appended to a call
//! log so tests can assert on the exact mutation sequence. A couple of
//! seams exist purely for tests: duplicate-application injection (to
//! provoke ambiguity) and per-operation failure injection (to exercise
//! partial application).

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use slipway_platform::{
    ApplicationUpdate, BuildConfig, CreatedProject, DeployKeyProvider, DockerProvider,
    DomainSpec, GithubAppProvider, PlatformApi, PlatformError, PublicGitProvider,
    RemoteApplication, RemoteDomain, RemoteEnvironment, RemoteProject, Result,
};

/// One recorded remote mutation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    CreateProject { name: String },
    CreateApplication { name: String },
    UpdateApplication { id: String, update: ApplicationUpdate },
    DeleteApplication { id: String },
    SaveGithubAppSource { id: String },
    SaveDeployKeySource { id: String },
    SavePublicGitSource { id: String },
    SaveDockerSource { id: String, image: String },
    SaveBuildConfig { id: String },
    SaveEnvironment { id: String, blob: String },
    CreateDomain { app_id: String, host: String, port: u16 },
    UpdateDomain { domain_id: String, host: String, port: u16 },
    Deploy { app_id: String, title: String },
    Redeploy { app_id: String },
}

#[derive(Debug, Clone)]
struct StoredApplication {
    app: RemoteApplication,
    project_id: String,
    environment_id: String,
}

#[derive(Debug, Clone)]
struct StoredDomain {
    domain: RemoteDomain,
    app_id: String,
}

#[derive(Debug, Default)]
struct State {
    projects: Vec<RemoteProject>,
    applications: HashMap<String, StoredApplication>,
    domains: HashMap<String, StoredDomain>,
    calls: Vec<PlatformCall>,
    fail_ops: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    state: RwLock<State>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(prefix: &str) -> String {
        format!("{prefix}-{}", uuid::Uuid::new_v4())
    }

    /// Every mutating call recorded so far, in order.
    pub async fn calls(&self) -> Vec<PlatformCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.state.write().await.calls.clear();
    }

    /// Makes every future call of the named operation fail with HTTP 500.
    pub async fn fail_on(&self, op: &str) {
        self.state.write().await.fail_ops.insert(op.to_string());
    }

    /// Clears all injected failures.
    pub async fn clear_fail(&self) {
        self.state.write().await.fail_ops.clear();
    }

    /// Inserts a second application with an existing name, bypassing the
    /// API, to simulate the duplicate state the reconciler must refuse to
    /// auto-resolve.
    pub async fn inject_duplicate_application(&self, name: &str) {
        let mut state = self.state.write().await;
        let existing = state
            .applications
            .values()
            .find(|stored| stored.app.name == name)
            .cloned()
            .expect("application to duplicate must exist");
        let id = Self::next_id("app");
        state.applications.insert(
            id.clone(),
            StoredApplication {
                app: RemoteApplication {
                    id,
                    name: name.to_string(),
                    source_type: None,
                    cpu_limit: None,
                    memory_limit: None,
                },
                ..existing
            },
        );
    }

    /// Domain rows currently attached to an application.
    pub async fn domains_for(&self, app_id: &str) -> Vec<RemoteDomain> {
        let state = self.state.read().await;
        state
            .domains
            .values()
            .filter(|stored| stored.app_id == app_id)
            .map(|stored| stored.domain.clone())
            .collect()
    }

    fn check_fail(state: &State, op: &str) -> Result<()> {
        if state.fail_ops.contains(op) {
            return Err(PlatformError::api(500, format!("injected failure: {op}")));
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformApi for InMemoryPlatform {
    async fn ping(&self) -> Result<()> {
        let state = self.state.read().await;
        Self::check_fail(&state, "ping")
    }

    async fn find_project_by_name(&self, name: &str) -> Result<Option<RemoteProject>> {
        let state = self.state.read().await;
        Self::check_fail(&state, "find_project_by_name")?;
        Ok(state.projects.iter().find(|p| p.name == name).cloned())
    }

    async fn get_project(&self, id: &str) -> Result<RemoteProject> {
        let state = self.state.read().await;
        Self::check_fail(&state, "get_project")?;
        state
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found("project", id))
    }

    async fn create_project(&self, name: &str) -> Result<CreatedProject> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "create_project")?;
        let environment = RemoteEnvironment {
            id: Self::next_id("env"),
            name: "production".to_string(),
        };
        let project = RemoteProject {
            id: Self::next_id("proj"),
            name: name.to_string(),
            environments: vec![environment.clone()],
        };
        state.projects.push(project.clone());
        state.calls.push(PlatformCall::CreateProject {
            name: name.to_string(),
        });
        Ok(CreatedProject {
            project,
            environment,
        })
    }

    async fn list_applications(
        &self,
        project_id: &str,
        environment_id: &str,
    ) -> Result<Vec<RemoteApplication>> {
        let state = self.state.read().await;
        Self::check_fail(&state, "list_applications")?;
        Ok(state
            .applications
            .values()
            .filter(|stored| {
                stored.project_id == project_id && stored.environment_id == environment_id
            })
            .map(|stored| stored.app.clone())
            .collect())
    }

    async fn get_application(&self, id: &str) -> Result<RemoteApplication> {
        let state = self.state.read().await;
        Self::check_fail(&state, "get_application")?;
        state
            .applications
            .get(id)
            .map(|stored| stored.app.clone())
            .ok_or_else(|| PlatformError::not_found("application", id))
    }

    async fn create_application(
        &self,
        project_id: &str,
        environment_id: &str,
        name: &str,
    ) -> Result<RemoteApplication> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "create_application")?;
        let app = RemoteApplication {
            id: Self::next_id("app"),
            name: name.to_string(),
            source_type: None,
            cpu_limit: None,
            memory_limit: None,
        };
        state.applications.insert(
            app.id.clone(),
            StoredApplication {
                app: app.clone(),
                project_id: project_id.to_string(),
                environment_id: environment_id.to_string(),
            },
        );
        state.calls.push(PlatformCall::CreateApplication {
            name: name.to_string(),
        });
        Ok(app)
    }

    async fn update_application(&self, id: &str, update: &ApplicationUpdate) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "update_application")?;
        let stored = state
            .applications
            .get_mut(id)
            .ok_or_else(|| PlatformError::not_found("application", id))?;
        if let Some(source_type) = &update.source_type {
            stored.app.source_type = Some(source_type.clone());
        }
        if let Some(cpu) = update.cpu_limit {
            stored.app.cpu_limit = Some(cpu);
        }
        if let Some(memory) = update.memory_limit {
            stored.app.memory_limit = Some(memory);
        }
        state.calls.push(PlatformCall::UpdateApplication {
            id: id.to_string(),
            update: update.clone(),
        });
        Ok(())
    }

    async fn delete_application(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "delete_application")?;
        state
            .applications
            .remove(id)
            .ok_or_else(|| PlatformError::not_found("application", id))?;
        // The control plane cascades domains and deploy history.
        state.domains.retain(|_, stored| stored.app_id != id);
        state.calls.push(PlatformCall::DeleteApplication {
            id: id.to_string(),
        });
        Ok(())
    }

    async fn save_github_app_source(&self, id: &str, _source: &GithubAppProvider) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "save_github_app_source")?;
        if !state.applications.contains_key(id) {
            return Err(PlatformError::not_found("application", id));
        }
        if let Some(stored) = state.applications.get_mut(id) {
            stored.app.source_type = Some("github-app".to_string());
        }
        state.calls.push(PlatformCall::SaveGithubAppSource {
            id: id.to_string(),
        });
        Ok(())
    }

    async fn save_deploy_key_source(&self, id: &str, _source: &DeployKeyProvider) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "save_deploy_key_source")?;
        if let Some(stored) = state.applications.get_mut(id) {
            stored.app.source_type = Some("deploy-key".to_string());
        }
        state.calls.push(PlatformCall::SaveDeployKeySource {
            id: id.to_string(),
        });
        Ok(())
    }

    async fn save_public_git_source(&self, id: &str, _source: &PublicGitProvider) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "save_public_git_source")?;
        if let Some(stored) = state.applications.get_mut(id) {
            stored.app.source_type = Some("public-git".to_string());
        }
        state.calls.push(PlatformCall::SavePublicGitSource {
            id: id.to_string(),
        });
        Ok(())
    }

    async fn save_docker_source(&self, id: &str, source: &DockerProvider) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "save_docker_source")?;
        if let Some(stored) = state.applications.get_mut(id) {
            stored.app.source_type = Some("docker".to_string());
        }
        state.calls.push(PlatformCall::SaveDockerSource {
            id: id.to_string(),
            image: source.image.clone(),
        });
        Ok(())
    }

    async fn save_build_config(&self, id: &str, _build: &BuildConfig) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "save_build_config")?;
        state.calls.push(PlatformCall::SaveBuildConfig {
            id: id.to_string(),
        });
        Ok(())
    }

    async fn save_environment(&self, id: &str, blob: &str) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "save_environment")?;
        state.calls.push(PlatformCall::SaveEnvironment {
            id: id.to_string(),
            blob: blob.to_string(),
        });
        Ok(())
    }

    async fn create_domain(&self, app_id: &str, domain: &DomainSpec) -> Result<RemoteDomain> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "create_domain")?;
        let created = RemoteDomain {
            id: Self::next_id("dom"),
            host: domain.host.clone(),
            port: domain.port,
            tls_mode: Some("full".to_string()),
        };
        state.domains.insert(
            created.id.clone(),
            StoredDomain {
                domain: created.clone(),
                app_id: app_id.to_string(),
            },
        );
        state.calls.push(PlatformCall::CreateDomain {
            app_id: app_id.to_string(),
            host: domain.host.clone(),
            port: domain.port,
        });
        Ok(created)
    }

    async fn list_domains(&self, app_id: &str) -> Result<Vec<RemoteDomain>> {
        let state = self.state.read().await;
        Self::check_fail(&state, "list_domains")?;
        Ok(state
            .domains
            .values()
            .filter(|stored| stored.app_id == app_id)
            .map(|stored| stored.domain.clone())
            .collect())
    }

    async fn update_domain(&self, domain_id: &str, domain: &DomainSpec) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "update_domain")?;
        let stored = state
            .domains
            .get_mut(domain_id)
            .ok_or_else(|| PlatformError::not_found("domain", domain_id))?;
        stored.domain.host = domain.host.clone();
        stored.domain.port = domain.port;
        state.calls.push(PlatformCall::UpdateDomain {
            domain_id: domain_id.to_string(),
            host: domain.host.clone(),
            port: domain.port,
        });
        Ok(())
    }

    async fn deploy(&self, app_id: &str, title: &str) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "deploy")?;
        state.calls.push(PlatformCall::Deploy {
            app_id: app_id.to_string(),
            title: title.to_string(),
        });
        Ok(())
    }

    async fn redeploy(&self, app_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        Self::check_fail(&state, "redeploy")?;
        state.calls.push(PlatformCall::Redeploy {
            app_id: app_id.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_project_returns_default_environment() {
        let platform = InMemoryPlatform::new();
        let created = platform.create_project("shared").await.unwrap();
        assert_eq!(created.project.environments.len(), 1);
        assert_eq!(created.environment.name, "production");

        let found = platform.find_project_by_name("shared").await.unwrap();
        assert_eq!(found.unwrap().id, created.project.id);
    }

    #[tokio::test]
    async fn test_application_lifecycle() {
        let platform = InMemoryPlatform::new();
        let created = platform.create_project("shared").await.unwrap();
        let app = platform
            .create_application(&created.project.id, &created.environment.id, "demo")
            .await
            .unwrap();

        let listed = platform
            .list_applications(&created.project.id, &created.environment.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "demo");

        platform
            .update_application(&app.id, &ApplicationUpdate::quota(2000, 2048))
            .await
            .unwrap();
        let fetched = platform.get_application(&app.id).await.unwrap();
        assert_eq!(fetched.cpu_limit, Some(2000));

        platform.delete_application(&app.id).await.unwrap();
        assert!(platform.get_application(&app.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_cascades_domains() {
        let platform = InMemoryPlatform::new();
        let created = platform.create_project("shared").await.unwrap();
        let app = platform
            .create_application(&created.project.id, &created.environment.id, "demo")
            .await
            .unwrap();
        platform
            .create_domain(
                &app.id,
                &DomainSpec {
                    host: "demo-p.apps.example.com".into(),
                    port: 80,
                },
            )
            .await
            .unwrap();

        platform.delete_application(&app.id).await.unwrap();
        assert!(platform.domains_for(&app.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let platform = InMemoryPlatform::new();
        platform.fail_on("ping").await;
        let err = platform.ping().await.unwrap_err();
        assert!(err.to_string().contains("injected failure"));
    }

    #[tokio::test]
    async fn test_duplicate_injection_produces_two_matches() {
        let platform = InMemoryPlatform::new();
        let created = platform.create_project("shared").await.unwrap();
        platform
            .create_application(&created.project.id, &created.environment.id, "demo")
            .await
            .unwrap();
        platform.inject_duplicate_application("demo").await;

        let listed = platform
            .list_applications(&created.project.id, &created.environment.id)
            .await
            .unwrap();
        assert_eq!(listed.iter().filter(|a| a.name == "demo").count(), 2);
    }
}
