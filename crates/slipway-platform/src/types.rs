use serde::{Deserialize, Serialize};

/// The shared multi-tenant tenancy container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProject {
    pub id: String,
    pub name: String,
    /// The first environment is the authoritative one; a second is never
    /// created by this system.
    #[serde(default)]
    pub environments: Vec<RemoteEnvironment>,
}

impl RemoteProject {
    /// The single authoritative environment.
    pub fn primary_environment(&self) -> Option<&RemoteEnvironment> {
        self.environments.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEnvironment {
    pub id: String,
    pub name: String,
}

/// Returned by project creation: the project plus its default environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProject {
    pub project: RemoteProject,
    pub environment: RemoteEnvironment,
}

/// A deployable unit keyed by name inside an environment. Name uniqueness
/// is the system's central invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteApplication {
    pub id: String,
    pub name: String,
    #[serde(rename = "sourceType", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(rename = "cpuLimit", skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<u32>,
    #[serde(rename = "memoryLimit", skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u32>,
}

/// Partial update payload; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationUpdate {
    #[serde(rename = "sourceType", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(rename = "cpuLimit", skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<u32>,
    #[serde(rename = "memoryLimit", skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u32>,
}

impl ApplicationUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn quota(cpu_limit: u32, memory_limit: u32) -> Self {
        Self {
            cpu_limit: Some(cpu_limit),
            memory_limit: Some(memory_limit),
            ..Self::default()
        }
    }
}

/// An externally routable hostname and port for one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDomain {
    pub id: String,
    pub host: String,
    pub port: u16,
    #[serde(rename = "tlsMode", skip_serializing_if = "Option::is_none")]
    pub tls_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSpec {
    pub host: String,
    pub port: u16,
}

// Source providers are mutually exclusive per application: saving one
// replaces whichever was configured before.

/// Repository access through the organization-scoped integration identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubAppProvider {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Repository access through an organization-scoped private deploy key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployKeyProvider {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Anonymous public git transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicGitProvider {
    #[serde(rename = "repositoryUrl")]
    pub repository_url: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Prebuilt image pulled from a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerProvider {
    /// Full image reference including the tag.
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(rename = "type")]
    pub build_type: String,
    pub dockerfile: String,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}
