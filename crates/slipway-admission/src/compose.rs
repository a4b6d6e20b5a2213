use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::AdmissionError;

/// The subset of a compose descriptor the policy engine inspects.
///
/// Unknown keys are ignored; only security-relevant fields are modeled.
/// Absent fields deserialize to their empty defaults so that absence can
/// never trip a deny rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeDescriptor {
    #[serde(default)]
    pub services: IndexMap<String, ComposeService>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeService {
    #[serde(default)]
    pub privileged: Option<bool>,
    #[serde(default)]
    pub network_mode: Option<String>,
    #[serde(default)]
    pub pid: Option<String>,
    #[serde(default)]
    pub ipc: Option<String>,
    #[serde(default)]
    pub userns_mode: Option<String>,
    #[serde(default)]
    pub cap_add: Vec<String>,
    #[serde(default)]
    pub devices: Vec<String>,
    #[serde(default)]
    pub security_opt: Vec<String>,
    #[serde(default)]
    pub sysctls: Option<Sysctls>,
    #[serde(default)]
    pub cgroup_parent: Option<String>,
}

/// Compose allows sysctls as either a map or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Sysctls {
    Map(IndexMap<String, serde_yaml::Value>),
    List(Vec<String>),
}

impl Sysctls {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Map(map) => map.is_empty(),
            Self::List(list) => list.is_empty(),
        }
    }
}

impl ComposeDescriptor {
    pub fn from_yaml(input: &str) -> Result<Self, AdmissionError> {
        serde_yaml::from_str(input).map_err(AdmissionError::compose_parse)
    }
}

impl ComposeService {
    pub fn is_privileged(&self) -> bool {
        self.privileged == Some(true)
    }

    pub fn uses_host_namespace(&self) -> bool {
        let is_host = |v: &Option<String>| v.as_deref() == Some("host");
        is_host(&self.network_mode)
            || is_host(&self.pid)
            || is_host(&self.ipc)
            || is_host(&self.userns_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_benign_descriptor() {
        let descriptor = ComposeDescriptor::from_yaml(
            r#"
services:
  web:
    image: nginx:1.27
    ports:
      - "8080:80"
"#,
        )
        .unwrap();
        let web = &descriptor.services["web"];
        assert!(!web.is_privileged());
        assert!(!web.uses_host_namespace());
        assert!(web.cap_add.is_empty());
    }

    #[test]
    fn test_parse_dangerous_fields() {
        let descriptor = ComposeDescriptor::from_yaml(
            r#"
services:
  agent:
    privileged: true
    network_mode: host
    cap_add:
      - SYS_ADMIN
    sysctls:
      net.core.somaxconn: 1024
"#,
        )
        .unwrap();
        let agent = &descriptor.services["agent"];
        assert!(agent.is_privileged());
        assert!(agent.uses_host_namespace());
        assert_eq!(agent.cap_add, vec!["SYS_ADMIN"]);
        assert!(!agent.sysctls.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_sysctls_list_form() {
        let descriptor = ComposeDescriptor::from_yaml(
            r#"
services:
  worker:
    sysctls:
      - net.core.somaxconn=1024
"#,
        )
        .unwrap();
        assert!(!descriptor.services["worker"].sysctls.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_service_order_is_preserved() {
        let descriptor = ComposeDescriptor::from_yaml(
            r#"
services:
  zebra: {}
  alpha: {}
  middle: {}
"#,
        )
        .unwrap();
        let names: Vec<&str> = descriptor.services.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zebra", "alpha", "middle"]);
    }
}
