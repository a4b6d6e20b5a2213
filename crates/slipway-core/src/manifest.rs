use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// The only apiVersion accepted by this release.
pub const API_VERSION: &str = "slipway/v1";

/// The only kind accepted by this release.
pub const KIND_APPLICATION: &str = "Application";

/// A declarative desired-state document submitted by an application owner.
///
/// Manifests are re-parsed fresh on every run and never cached across runs:
/// the file on disk is the single source of truth for desired state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: AppSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Unique subdomain token for the application. DNS label, 3-63 chars.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub maintainer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSpec {
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildSpec>,
    pub resources: ResourcesSpec,
    pub ports: Vec<PortSpec>,
    #[serde(rename = "healthCheck", skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheckSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<EnvSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingSpec>,
}

/// Where the application is built from. Exactly one variant per manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Github(GithubSource),
    Docker(DockerSource),
}

impl Source {
    pub fn is_docker(&self) -> bool {
        matches!(self, Self::Docker(_))
    }

    /// The GitHub owner, if this is a repository source.
    pub fn github_owner(&self) -> Option<&str> {
        match self {
            Self::Github(gh) => Some(gh.owner.as_str()),
            Self::Docker(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubSource {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerSource {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl DockerSource {
    /// Full image reference including the tag when present.
    pub fn image_ref(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}:{}", self.image, tag),
            None => self.image.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSpec {
    #[serde(default = "BuildSpec::default_type", rename = "type")]
    pub build_type: String,
    #[serde(default = "BuildSpec::default_dockerfile")]
    pub dockerfile: String,
    #[serde(default = "BuildSpec::default_context")]
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl BuildSpec {
    fn default_type() -> String {
        "dockerfile".to_string()
    }

    fn default_dockerfile() -> String {
        "Dockerfile".to_string()
    }

    fn default_context() -> String {
        ".".to_string()
    }
}

impl Default for BuildSpec {
    fn default() -> Self {
        Self {
            build_type: Self::default_type(),
            dockerfile: Self::default_dockerfile(),
            context: Self::default_context(),
            stage: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcesSpec {
    pub size: crate::quota::ResourceSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    #[serde(rename = "containerPort")]
    pub container_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckSpec {
    pub path: String,
    pub port: u16,
}

/// Static environment values plus references into the process-wide secret
/// namespace. The `secretRefs` key is reserved; every other key is a literal
/// environment variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvSpec {
    #[serde(default, rename = "secretRefs", skip_serializing_if = "Vec::is_empty")]
    pub secret_refs: Vec<SecretRef>,
    #[serde(flatten)]
    pub values: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretRef {
    /// Environment variable name injected into the application.
    pub name: String,
    /// Secret key, resolved as `SECRET_{secret}` at reconcile time.
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingSpec {
    pub hostnames: Vec<String>,
}

impl Manifest {
    /// Parses a manifest from YAML and enforces the fixed apiVersion/kind.
    pub fn from_yaml(input: &str) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(input)?;
        if manifest.api_version != API_VERSION {
            return Err(CoreError::unsupported_api_version(&manifest.api_version));
        }
        if manifest.kind != KIND_APPLICATION {
            return Err(CoreError::unsupported_kind(&manifest.kind));
        }
        Ok(manifest)
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The primary container port; the derived domain routes here.
    pub fn primary_port(&self) -> Option<u16> {
        self.spec.ports.first().map(|p| p.container_port)
    }

    /// All declared container ports.
    pub fn declared_ports(&self) -> Vec<u16> {
        self.spec.ports.iter().map(|p| p.container_port).collect()
    }

    /// The build spec with defaults filled in. Docker sources never build.
    pub fn effective_build(&self) -> Option<BuildSpec> {
        if self.spec.source.is_docker() {
            return None;
        }
        Some(self.spec.build.clone().unwrap_or_default())
    }
}
