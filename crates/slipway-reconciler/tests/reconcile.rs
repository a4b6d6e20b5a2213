//! End-to-end reconciliation tests against the in-memory control plane.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use slipway_core::manifest::GithubSource;
use slipway_core::{Manifest, ReconcileOutcome, RemovalOutcome};
use slipway_platform::PlatformApi;
use slipway_platform_memory::{InMemoryPlatform, PlatformCall};
use slipway_reconciler::{
    AutoDeployInstaller, BatchDriver, INITIAL_DEPLOY_TITLE, Reconciler, ReconcilerSettings,
    SecretStore,
};

fn manifest(yaml: &str) -> Manifest {
    Manifest::from_yaml(yaml).unwrap()
}

fn demo(size: &str, port: u16) -> Manifest {
    manifest(&format!(
        r#"
apiVersion: slipway/v1
kind: Application
metadata:
  name: demo
  maintainer: team@example.com
spec:
  source:
    docker:
      image: nginx
      tag: latest
  resources:
    size: {size}
  ports:
    - containerPort: {port}
"#
    ))
}

fn github_app(owner: &str) -> Manifest {
    manifest(&format!(
        r#"
apiVersion: slipway/v1
kind: Application
metadata:
  name: api-service
  maintainer: api-team@example.com
spec:
  source:
    github:
      owner: {owner}
      repo: api-service
      branch: production
  resources:
    size: M
  ports:
    - containerPort: 3000
  healthCheck:
    path: /healthz
    port: 3000
"#
    ))
}

fn settings() -> ReconcilerSettings {
    ReconcilerSettings::new("shared", "apps.example.com")
}

fn reconciler(platform: &Arc<InMemoryPlatform>) -> Reconciler {
    Reconciler::new(
        platform.clone() as Arc<dyn PlatformApi>,
        settings(),
        SecretStore::default(),
    )
}

#[tokio::test]
async fn scenario_a_creates_application_domain_and_initial_deploy() {
    let platform = Arc::new(InMemoryPlatform::new());
    let result = reconciler(&platform).reconcile(&demo("S", 80)).await;

    assert!(result.success);
    assert_eq!(result.outcome, ReconcileOutcome::Created);
    assert_eq!(result.app_name, "demo");
    assert!(result.application_id.is_some());
    assert_eq!(
        result.domain.as_deref(),
        Some("https://demo-p.apps.example.com")
    );

    let calls = platform.calls().await;
    assert!(calls.contains(&PlatformCall::CreateProject {
        name: "shared".into()
    }));
    assert!(calls.contains(&PlatformCall::CreateApplication {
        name: "demo".into()
    }));
    assert!(calls.iter().any(|c| matches!(
        c,
        PlatformCall::SaveDockerSource { image, .. } if image == "nginx:latest"
    )));
    assert!(calls.iter().any(|c| matches!(
        c,
        PlatformCall::CreateDomain { host, port, .. }
            if host == "demo-p.apps.example.com" && *port == 80
    )));
    assert!(calls.iter().any(|c| matches!(
        c,
        PlatformCall::Deploy { title, .. } if title == INITIAL_DEPLOY_TITLE
    )));
    // Docker sources never get a build config.
    assert!(!calls.iter().any(|c| matches!(c, PlatformCall::SaveBuildConfig { .. })));
}

#[tokio::test]
async fn scenario_b_reapply_with_larger_size_updates_quota_and_redeploys() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = reconciler(&platform);

    let first = reconciler.reconcile(&demo("S", 80)).await;
    platform.clear_calls().await;

    let second = reconciler.reconcile(&demo("L", 80)).await;
    assert!(second.success);
    assert_eq!(second.outcome, ReconcileOutcome::Updated);
    assert_eq!(second.application_id, first.application_id);
    assert_eq!(second.domain, first.domain);

    let calls = platform.calls().await;
    assert!(calls.iter().any(|c| matches!(
        c,
        PlatformCall::UpdateApplication { update, .. }
            if update.cpu_limit == Some(4000) && update.memory_limit == Some(4096)
    )));
    assert!(calls.iter().any(|c| matches!(c, PlatformCall::Redeploy { .. })));
    assert!(!calls.iter().any(|c| matches!(c, PlatformCall::Deploy { .. })));
    assert!(!calls.iter().any(|c| matches!(c, PlatformCall::CreateDomain { .. })));
    assert!(!calls.iter().any(|c| matches!(c, PlatformCall::UpdateDomain { .. })));
}

#[tokio::test]
async fn reconcile_twice_is_idempotent() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = reconciler(&platform);

    let first = reconciler.reconcile(&demo("S", 80)).await;
    let second = reconciler.reconcile(&demo("S", 80)).await;

    assert_eq!(first.application_id, second.application_id);
    let domains = platform
        .domains_for(first.application_id.as_deref().unwrap())
        .await;
    assert_eq!(domains.len(), 1, "second run must not add a domain row");
}

#[tokio::test]
async fn duplicate_names_abort_with_ambiguity() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = reconciler(&platform);

    reconciler.reconcile(&demo("S", 80)).await;
    platform.inject_duplicate_application("demo").await;
    platform.clear_calls().await;

    let result = reconciler.reconcile(&demo("S", 80)).await;
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("Ambiguous"));

    // No mutation may follow the ambiguity detection.
    let calls = platform.calls().await;
    assert!(calls.is_empty(), "unexpected mutations: {calls:?}");
}

#[tokio::test]
async fn domain_port_drift_updates_in_place() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = reconciler(&platform);

    let first = reconciler.reconcile(&demo("S", 3000)).await;
    platform.clear_calls().await;

    let second = reconciler.reconcile(&demo("S", 8080)).await;
    assert!(second.success);

    let calls = platform.calls().await;
    assert!(calls.iter().any(|c| matches!(
        c,
        PlatformCall::UpdateDomain { host, port, .. }
            if host == "demo-p.apps.example.com" && *port == 8080
    )));
    assert!(!calls.iter().any(|c| matches!(c, PlatformCall::CreateDomain { .. })));

    let domains = platform
        .domains_for(first.application_id.as_deref().unwrap())
        .await;
    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0].port, 8080);
}

#[tokio::test]
async fn missing_domain_is_recreated_on_update() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = reconciler(&platform);

    // Application exists but has no domain yet (e.g. an earlier run died
    // between application creation and domain creation).
    let created = platform.create_project("shared").await.unwrap();
    platform
        .create_application(&created.project.id, &created.environment.id, "demo")
        .await
        .unwrap();
    platform.clear_calls().await;

    let result = reconciler.reconcile(&demo("S", 80)).await;
    assert!(result.success);
    assert_eq!(result.outcome, ReconcileOutcome::Updated);

    let calls = platform.calls().await;
    assert!(calls.iter().any(|c| matches!(c, PlatformCall::CreateDomain { .. })));
}

#[tokio::test]
async fn remote_failure_aborts_run_but_keeps_prior_side_effects() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = reconciler(&platform);
    platform.fail_on("create_domain").await;

    let result = reconciler.reconcile(&demo("S", 80)).await;
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("injected failure"));

    // Steps before the failure stand uncompensated; nothing after runs.
    let calls = platform.calls().await;
    assert!(calls.iter().any(|c| matches!(c, PlatformCall::CreateApplication { .. })));
    assert!(calls.iter().any(|c| matches!(c, PlatformCall::SaveDockerSource { .. })));
    assert!(!calls.iter().any(|c| matches!(c, PlatformCall::Deploy { .. })));
}

#[tokio::test]
async fn next_run_repairs_partial_application() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = reconciler(&platform);
    platform.fail_on("create_domain").await;

    let failed = reconciler.reconcile(&demo("S", 80)).await;
    assert!(!failed.success);

    // The failure clears (transient remote issue); the next run converges.
    platform.clear_fail().await;
    let repaired = reconciler.reconcile(&demo("S", 80)).await;
    assert!(repaired.success);
    assert_eq!(repaired.outcome, ReconcileOutcome::Updated);
    let domains = platform
        .domains_for(repaired.application_id.as_deref().unwrap())
        .await;
    assert_eq!(domains.len(), 1);
}

#[tokio::test]
async fn environment_blob_merges_statics_and_secrets() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = Reconciler::new(
        platform.clone() as Arc<dyn PlatformApi>,
        settings(),
        SecretStore::from_pairs([("api_db", "postgres://db")]),
    );

    let m = manifest(
        r#"
apiVersion: slipway/v1
kind: Application
metadata:
  name: demo
  maintainer: team@example.com
spec:
  source:
    docker:
      image: nginx
      tag: "1.27"
  resources:
    size: S
  ports:
    - containerPort: 80
  env:
    LOG_LEVEL: info
    secretRefs:
      - name: DATABASE_URL
        secret: api_db
      - name: MISSING
        secret: not_there
"#,
    );

    let result = reconciler.reconcile(&m).await;
    assert!(result.success);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("SECRET_not_there"));

    let calls = platform.calls().await;
    let blob = calls
        .iter()
        .find_map(|c| match c {
            PlatformCall::SaveEnvironment { blob, .. } => Some(blob.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(blob, "LOG_LEVEL=info\nDATABASE_URL=postgres://db");
}

struct RecordingInstaller {
    fail: bool,
    installed: Mutex<Vec<String>>,
}

#[async_trait]
impl AutoDeployInstaller for RecordingInstaller {
    async fn install(&self, source: &GithubSource, application_id: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("workflow push rejected");
        }
        self.installed
            .lock()
            .await
            .push(format!("{}/{}:{application_id}", source.owner, source.repo));
        Ok(())
    }
}

#[tokio::test]
async fn auto_deploy_configured_for_allow_listed_owner() {
    let platform = Arc::new(InMemoryPlatform::new());
    let installer = Arc::new(RecordingInstaller {
        fail: false,
        installed: Mutex::new(Vec::new()),
    });
    let reconciler = Reconciler::new(
        platform.clone() as Arc<dyn PlatformApi>,
        settings().with_auto_deploy_owners(["example"]),
        SecretStore::default(),
    )
    .with_auto_deploy(installer.clone());

    let result = reconciler.reconcile(&github_app("example")).await;
    assert!(result.success);
    assert_eq!(result.auto_deploy_configured, Some(true));
    assert_eq!(installer.installed.lock().await.len(), 1);
}

#[tokio::test]
async fn auto_deploy_failure_downgrades_but_run_succeeds() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = Reconciler::new(
        platform.clone() as Arc<dyn PlatformApi>,
        settings().with_auto_deploy_owners(["example"]),
        SecretStore::default(),
    )
    .with_auto_deploy(Arc::new(RecordingInstaller {
        fail: true,
        installed: Mutex::new(Vec::new()),
    }));

    let result = reconciler.reconcile(&github_app("example")).await;
    assert!(result.success, "auto-deploy failure must not fail the run");
    assert_eq!(result.auto_deploy_configured, Some(false));
    assert!(result.warnings.iter().any(|w| w.contains("auto-deploy")));
}

#[tokio::test]
async fn auto_deploy_skipped_for_owner_off_allow_list() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = Reconciler::new(
        platform.clone() as Arc<dyn PlatformApi>,
        settings().with_auto_deploy_owners(["example"]),
        SecretStore::default(),
    )
    .with_auto_deploy(Arc::new(RecordingInstaller {
        fail: false,
        installed: Mutex::new(Vec::new()),
    }));

    let result = reconciler.reconcile(&github_app("unrelated")).await;
    assert!(result.success);
    assert_eq!(result.auto_deploy_configured, None);
}

#[tokio::test]
async fn source_strategy_precedence_selects_github_app() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = Reconciler::new(
        platform.clone() as Arc<dyn PlatformApi>,
        settings()
            .with_github_app_owners(["example"])
            .with_deploy_key_owners(["example"]),
        SecretStore::default(),
    );

    let result = reconciler.reconcile(&github_app("example")).await;
    assert!(result.success);
    let calls = platform.calls().await;
    assert!(calls.iter().any(|c| matches!(c, PlatformCall::SaveGithubAppSource { .. })));
    assert!(!calls.iter().any(|c| matches!(c, PlatformCall::SaveDeployKeySource { .. })));
    // Repository sources do get a build config.
    assert!(calls.iter().any(|c| matches!(c, PlatformCall::SaveBuildConfig { .. })));
}

#[tokio::test]
async fn removal_is_idempotent() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = reconciler(&platform);

    // Nothing exists yet: absence is convergence.
    let absent = reconciler.remove("demo").await;
    assert_eq!(absent.outcome, RemovalOutcome::Absent);

    reconciler.reconcile(&demo("S", 80)).await;
    let deleted = reconciler.remove("demo").await;
    assert_eq!(deleted.outcome, RemovalOutcome::Deleted);

    let again = reconciler.remove("demo").await;
    assert_eq!(again.outcome, RemovalOutcome::Absent);
}

#[tokio::test]
async fn removal_refuses_ambiguous_names() {
    let platform = Arc::new(InMemoryPlatform::new());
    let reconciler = reconciler(&platform);

    reconciler.reconcile(&demo("S", 80)).await;
    platform.inject_duplicate_application("demo").await;

    let result = reconciler.remove("demo").await;
    assert_eq!(result.outcome, RemovalOutcome::Failed);
    assert!(result.error.as_deref().unwrap().contains("Ambiguous"));
}

#[tokio::test]
async fn batch_continues_past_failures_and_reports_them() {
    let platform = Arc::new(InMemoryPlatform::new());
    let driver = BatchDriver::new(reconciler(&platform));

    // Seed a duplicate for the second manifest so it fails mid-batch.
    let seeded = reconciler(&platform);
    seeded.reconcile(&demo("S", 80)).await;
    platform.inject_duplicate_application("demo").await;

    let other = manifest(
        r#"
apiVersion: slipway/v1
kind: Application
metadata:
  name: other
  maintainer: team@example.com
spec:
  source:
    docker:
      image: redis
      tag: "7"
  resources:
    size: S
  ports:
    - containerPort: 6379
"#,
    );

    let outcome = driver
        .apply_all(&[demo("S", 80), other])
        .await
        .unwrap();
    assert_eq!(outcome.results.len(), 2);
    assert!(!outcome.results[0].success);
    assert!(outcome.results[1].success, "failure must not block the rest");
    assert!(outcome.any_failed());
}

#[tokio::test]
async fn batch_aborts_when_liveness_probe_fails() {
    let platform = Arc::new(InMemoryPlatform::new());
    platform.fail_on("ping").await;
    let driver = BatchDriver::new(reconciler(&platform));

    let err = driver.apply_all(&[demo("S", 80)]).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(platform.calls().await.is_empty());
}
