use std::collections::{HashMap, HashSet};

/// Read-only configuration injected into the reconciler at construction
/// time, never read from ambient global state.
#[derive(Debug, Clone)]
pub struct ReconcilerSettings {
    /// Name of the single shared multi-tenant project.
    pub project_name: String,
    /// Managed domain suffix; derived hosts end with it.
    pub domain_suffix: String,
    /// Owners with an organization-scoped integration identity registered.
    pub github_app_owners: HashSet<String>,
    /// Owners with an organization-scoped private deploy key registered.
    pub deploy_key_owners: HashSet<String>,
    /// Owners eligible for best-effort auto-deploy provisioning.
    pub auto_deploy_owners: HashSet<String>,
}

impl ReconcilerSettings {
    pub fn new(project_name: impl Into<String>, domain_suffix: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            domain_suffix: domain_suffix.into(),
            github_app_owners: HashSet::new(),
            deploy_key_owners: HashSet::new(),
            auto_deploy_owners: HashSet::new(),
        }
    }

    pub fn with_github_app_owners(
        mut self,
        owners: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.github_app_owners = fold(owners);
        self
    }

    pub fn with_deploy_key_owners(
        mut self,
        owners: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.deploy_key_owners = fold(owners);
        self
    }

    pub fn with_auto_deploy_owners(
        mut self,
        owners: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.auto_deploy_owners = fold(owners);
        self
    }

    pub fn has_github_app(&self, owner: &str) -> bool {
        self.github_app_owners.contains(&owner.to_lowercase())
    }

    pub fn has_deploy_key(&self, owner: &str) -> bool {
        self.deploy_key_owners.contains(&owner.to_lowercase())
    }

    pub fn allows_auto_deploy(&self, owner: &str) -> bool {
        self.auto_deploy_owners.contains(&owner.to_lowercase())
    }
}

fn fold(owners: impl IntoIterator<Item = impl Into<String>>) -> HashSet<String> {
    owners.into_iter().map(|o| o.into().to_lowercase()).collect()
}

/// Snapshot of the process-wide secret namespace, taken once per run.
///
/// Secrets live under `SECRET_{key}` environment variables; the snapshot is
/// injected so the core stays testable against fixture stores.
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    values: HashMap<String, String>,
}

/// Prefix of every resolvable environment variable.
pub const SECRET_PREFIX: &str = "SECRET_";

impl SecretStore {
    /// Snapshots every `SECRET_`-prefixed variable from the process
    /// environment.
    pub fn from_env() -> Self {
        Self {
            values: std::env::vars()
                .filter(|(key, _)| key.starts_with(SECRET_PREFIX))
                .collect(),
        }
    }

    /// Fixture store for tests: keys are given without the prefix.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (format!("{SECRET_PREFIX}{}", k.into()), v.into()))
                .collect(),
        }
    }

    /// Resolves a secretRef key to its value, if present in the namespace.
    pub fn resolve(&self, secret: &str) -> Option<&str> {
        self.values
            .get(&format!("{SECRET_PREFIX}{secret}"))
            .map(String::as_str)
    }
}
