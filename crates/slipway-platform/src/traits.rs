//! The typed RPC façade over the remote control plane.
//!
//! Everything the reconciler does remotely goes through [`PlatformApi`], so
//! the convergence protocol can be exercised against an in-memory
//! implementation without a live control plane.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    ApplicationUpdate, BuildConfig, CreatedProject, DeployKeyProvider, DockerProvider,
    DomainSpec, GithubAppProvider, PublicGitProvider, RemoteApplication, RemoteDomain,
    RemoteProject,
};

/// The remote control-plane surface consumed by the reconciler.
///
/// Implementations must be thread-safe (`Send + Sync`). Every call is a
/// blocking remote round-trip awaited before the next begins; the core
/// performs no retries and no cancellation.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    // ==================== Liveness ====================

    /// Trivial listable call used before any batch runs.
    async fn ping(&self) -> Result<()>;

    // ==================== Projects ====================

    /// Finds a project by exact name.
    async fn find_project_by_name(&self, name: &str) -> Result<Option<RemoteProject>>;

    /// Fetches a project by id. `environments[0]` is authoritative.
    async fn get_project(&self, id: &str) -> Result<RemoteProject>;

    /// Creates a project together with its default environment.
    ///
    /// Not atomic against concurrent callers: two racing runs can both
    /// observe absence and create duplicates. Find-by-name idempotency is
    /// the documented mitigation.
    async fn create_project(&self, name: &str) -> Result<CreatedProject>;

    // ==================== Applications ====================

    /// Lists every application in one environment.
    async fn list_applications(
        &self,
        project_id: &str,
        environment_id: &str,
    ) -> Result<Vec<RemoteApplication>>;

    async fn get_application(&self, id: &str) -> Result<RemoteApplication>;

    async fn create_application(
        &self,
        project_id: &str,
        environment_id: &str,
        name: &str,
    ) -> Result<RemoteApplication>;

    async fn update_application(&self, id: &str, update: &ApplicationUpdate) -> Result<()>;

    /// Deletes an application; the remote side cascades domains and deploy
    /// history.
    async fn delete_application(&self, id: &str) -> Result<()>;

    // ==================== Source configuration ====================
    // Mutually exclusive per application: saving one provider replaces any
    // previously configured one.

    async fn save_github_app_source(&self, id: &str, source: &GithubAppProvider) -> Result<()>;

    async fn save_deploy_key_source(&self, id: &str, source: &DeployKeyProvider) -> Result<()>;

    async fn save_public_git_source(&self, id: &str, source: &PublicGitProvider) -> Result<()>;

    async fn save_docker_source(&self, id: &str, source: &DockerProvider) -> Result<()>;

    // ==================== Build & environment ====================

    async fn save_build_config(&self, id: &str, build: &BuildConfig) -> Result<()>;

    /// Replaces the application environment with a newline-delimited
    /// `KEY=VALUE` blob.
    async fn save_environment(&self, id: &str, blob: &str) -> Result<()>;

    // ==================== Domains ====================

    async fn create_domain(&self, app_id: &str, domain: &DomainSpec) -> Result<RemoteDomain>;

    async fn list_domains(&self, app_id: &str) -> Result<Vec<RemoteDomain>>;

    async fn update_domain(&self, domain_id: &str, domain: &DomainSpec) -> Result<()>;

    // ==================== Deployments ====================

    /// Initial deployment with a fixed, human-visible title.
    async fn deploy(&self, app_id: &str, title: &str) -> Result<()>;

    /// Redeploy an existing application; distinct build-cache and rollout
    /// semantics on the remote side.
    async fn redeploy(&self, app_id: &str) -> Result<()>;
}
