use serde_yaml::Value;

use slipway_core::domain::{is_dns_label, is_within_suffix};
use slipway_core::manifest::{API_VERSION, KIND_APPLICATION};

/// One structural violation, located by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    pub path: String,
    pub message: String,
}

impl SchemaIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Structural contract enforcement on a raw manifest document.
///
/// Collects every violation in one pass instead of bailing on the first, so
/// a single review round reports every problem. No side effects; a failed
/// manifest is reported per-manifest and is never fatal to the process.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    domain_suffix: String,
}

impl SchemaValidator {
    pub fn new(domain_suffix: impl Into<String>) -> Self {
        Self {
            domain_suffix: domain_suffix.into(),
        }
    }

    pub fn validate(&self, doc: &Value) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();

        match doc.get("apiVersion").and_then(Value::as_str) {
            Some(API_VERSION) => {}
            Some(other) => issues.push(SchemaIssue::new(
                "apiVersion",
                format!("must be \"{API_VERSION}\", got \"{other}\""),
            )),
            None => issues.push(SchemaIssue::new("apiVersion", "required string is missing")),
        }

        match doc.get("kind").and_then(Value::as_str) {
            Some(KIND_APPLICATION) => {}
            Some(other) => issues.push(SchemaIssue::new(
                "kind",
                format!("must be \"{KIND_APPLICATION}\", got \"{other}\""),
            )),
            None => issues.push(SchemaIssue::new("kind", "required string is missing")),
        }

        self.validate_metadata(doc.get("metadata"), &mut issues);
        self.validate_spec(doc.get("spec"), &mut issues);

        issues
    }

    fn validate_metadata(&self, metadata: Option<&Value>, issues: &mut Vec<SchemaIssue>) {
        let Some(metadata) = metadata else {
            issues.push(SchemaIssue::new("metadata", "required section is missing"));
            return;
        };

        match metadata.get("name").and_then(Value::as_str) {
            Some(name) if is_dns_label(name) => {}
            Some(name) => issues.push(SchemaIssue::new(
                "metadata.name",
                format!(
                    "\"{name}\" must be a DNS label of 3-63 lowercase alphanumerics or hyphens"
                ),
            )),
            None => issues.push(SchemaIssue::new(
                "metadata.name",
                "required string is missing",
            )),
        }

        match metadata.get("maintainer").and_then(Value::as_str) {
            Some(maintainer) if !maintainer.trim().is_empty() => {}
            Some(_) => issues.push(SchemaIssue::new("metadata.maintainer", "must not be empty")),
            None => issues.push(SchemaIssue::new(
                "metadata.maintainer",
                "required string is missing",
            )),
        }
    }

    fn validate_spec(&self, spec: Option<&Value>, issues: &mut Vec<SchemaIssue>) {
        let Some(spec) = spec else {
            issues.push(SchemaIssue::new("spec", "required section is missing"));
            return;
        };

        self.validate_source(spec.get("source"), issues);
        self.validate_resources(spec.get("resources"), issues);
        let declared = self.validate_ports(spec.get("ports"), issues);
        self.validate_health_check(spec.get("healthCheck"), &declared, issues);
        self.validate_env(spec.get("env"), issues);
        self.validate_routing(spec.get("routing"), issues);
    }

    fn validate_source(&self, source: Option<&Value>, issues: &mut Vec<SchemaIssue>) {
        let Some(source) = source.filter(|v| v.is_mapping()) else {
            issues.push(SchemaIssue::new("spec.source", "required section is missing"));
            return;
        };

        let github = source.get("github");
        let docker = source.get("docker");
        match (github, docker) {
            (Some(gh), None) => {
                for field in ["owner", "repo", "branch"] {
                    match gh.get(field).and_then(Value::as_str) {
                        Some(v) if !v.trim().is_empty() => {}
                        _ => issues.push(SchemaIssue::new(
                            format!("spec.source.github.{field}"),
                            "required string is missing",
                        )),
                    }
                }
            }
            (None, Some(dk)) => match dk.get("image").and_then(Value::as_str) {
                Some(image) if !image.trim().is_empty() => {}
                _ => issues.push(SchemaIssue::new(
                    "spec.source.docker.image",
                    "required string is missing",
                )),
            },
            (Some(_), Some(_)) => issues.push(SchemaIssue::new(
                "spec.source",
                "exactly one of github or docker must be set, got both",
            )),
            (None, None) => issues.push(SchemaIssue::new(
                "spec.source",
                "exactly one of github or docker must be set",
            )),
        }
    }

    fn validate_resources(&self, resources: Option<&Value>, issues: &mut Vec<SchemaIssue>) {
        let Some(resources) = resources else {
            issues.push(SchemaIssue::new(
                "spec.resources",
                "required section is missing",
            ));
            return;
        };

        match resources.get("size").and_then(Value::as_str) {
            Some("S" | "M" | "L") => {}
            Some(other) => issues.push(SchemaIssue::new(
                "spec.resources.size",
                format!("must be one of S, M, L, got \"{other}\""),
            )),
            None => issues.push(SchemaIssue::new(
                "spec.resources.size",
                "required enum is missing",
            )),
        }
    }

    /// Validates ports and returns the declared container ports for the
    /// cross-field health check below.
    fn validate_ports(&self, ports: Option<&Value>, issues: &mut Vec<SchemaIssue>) -> Vec<u16> {
        let mut declared = Vec::new();
        let Some(ports) = ports.and_then(Value::as_sequence) else {
            issues.push(SchemaIssue::new("spec.ports", "required list is missing"));
            return declared;
        };

        if ports.is_empty() {
            issues.push(SchemaIssue::new("spec.ports", "must declare at least one port"));
            return declared;
        }

        for (idx, port) in ports.iter().enumerate() {
            match port.get("containerPort").and_then(Value::as_u64) {
                Some(n) if (1..=65535).contains(&n) => declared.push(n as u16),
                Some(n) => issues.push(SchemaIssue::new(
                    format!("spec.ports[{idx}].containerPort"),
                    format!("must be in 1-65535, got {n}"),
                )),
                None => issues.push(SchemaIssue::new(
                    format!("spec.ports[{idx}].containerPort"),
                    "required integer is missing",
                )),
            }
        }
        declared
    }

    fn validate_health_check(
        &self,
        health: Option<&Value>,
        declared_ports: &[u16],
        issues: &mut Vec<SchemaIssue>,
    ) {
        let Some(health) = health else {
            return; // optional; absence is a policy warning, not a violation
        };

        match health.get("path").and_then(Value::as_str) {
            Some(path) if path.starts_with('/') => {}
            Some(path) => issues.push(SchemaIssue::new(
                "spec.healthCheck.path",
                format!("must start with '/', got \"{path}\""),
            )),
            None => issues.push(SchemaIssue::new(
                "spec.healthCheck.path",
                "required string is missing",
            )),
        }

        match health.get("port").and_then(Value::as_u64) {
            Some(port) if declared_ports.contains(&(port as u16)) => {}
            Some(port) => issues.push(SchemaIssue::new(
                "spec.healthCheck.port",
                format!("port {port} does not match any declared container port"),
            )),
            None => issues.push(SchemaIssue::new(
                "spec.healthCheck.port",
                "required integer is missing",
            )),
        }
    }

    fn validate_env(&self, env: Option<&Value>, issues: &mut Vec<SchemaIssue>) {
        let Some(env) = env.and_then(Value::as_mapping) else {
            return;
        };

        for (key, value) in env {
            let Some(key) = key.as_str() else {
                issues.push(SchemaIssue::new("spec.env", "keys must be strings"));
                continue;
            };
            if key == "secretRefs" {
                self.validate_secret_refs(value, issues);
            } else if !value.is_string() {
                issues.push(SchemaIssue::new(
                    format!("spec.env.{key}"),
                    "values must be strings",
                ));
            }
        }
    }

    fn validate_secret_refs(&self, refs: &Value, issues: &mut Vec<SchemaIssue>) {
        let Some(refs) = refs.as_sequence() else {
            issues.push(SchemaIssue::new("spec.env.secretRefs", "must be a list"));
            return;
        };

        for (idx, entry) in refs.iter().enumerate() {
            for field in ["name", "secret"] {
                match entry.get(field).and_then(Value::as_str) {
                    Some(v) if !v.trim().is_empty() => {}
                    _ => issues.push(SchemaIssue::new(
                        format!("spec.env.secretRefs[{idx}].{field}"),
                        "required string is missing",
                    )),
                }
            }
        }
    }

    fn validate_routing(&self, routing: Option<&Value>, issues: &mut Vec<SchemaIssue>) {
        let Some(routing) = routing else {
            return;
        };

        let Some(hostnames) = routing.get("hostnames").and_then(Value::as_sequence) else {
            issues.push(SchemaIssue::new(
                "spec.routing.hostnames",
                "required list is missing",
            ));
            return;
        };

        if hostnames.is_empty() {
            issues.push(SchemaIssue::new(
                "spec.routing.hostnames",
                "must not be empty when routing is set",
            ));
        }

        for (idx, host) in hostnames.iter().enumerate() {
            match host.as_str() {
                Some(host) if is_within_suffix(host, &self.domain_suffix) => {}
                Some(host) => issues.push(SchemaIssue::new(
                    format!("spec.routing.hostnames[{idx}]"),
                    format!(
                        "\"{host}\" must lie within the managed suffix \"{}\"",
                        self.domain_suffix
                    ),
                )),
                None => issues.push(SchemaIssue::new(
                    format!("spec.routing.hostnames[{idx}]"),
                    "must be a string",
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> SchemaValidator {
        SchemaValidator::new("apps.example.com")
    }

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn valid_doc() -> Value {
        parse(
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
    size: S
  ports:
    - containerPort: 80
"#,
        )
    }

    #[test]
    fn test_valid_manifest_has_no_issues() {
        assert!(validator().validate(&valid_doc()).is_empty());
    }

    #[test]
    fn test_collects_all_violations_in_one_pass() {
        let doc = parse(
            r#"
apiVersion: wrong/v9
kind: Application
metadata:
  name: ab
spec:
  source: {}
  resources:
    size: XL
  ports: []
"#,
        );
        let issues = validator().validate(&doc);
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"apiVersion"));
        assert!(paths.contains(&"metadata.name"));
        assert!(paths.contains(&"metadata.maintainer"));
        assert!(paths.contains(&"spec.source"));
        assert!(paths.contains(&"spec.resources.size"));
        assert!(paths.contains(&"spec.ports"));
        assert!(issues.len() >= 6);
    }

    #[test]
    fn test_both_sources_rejected() {
        let doc = parse(
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
    github:
      owner: example
      repo: demo
      branch: main
  resources:
    size: S
  ports:
    - containerPort: 80
"#,
        );
        let issues = validator().validate(&doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "spec.source");
        assert!(issues[0].message.contains("got both"));
    }

    #[test]
    fn test_health_check_port_must_match_declared_port() {
        let doc = parse(
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
  resources:
    size: S
  ports:
    - containerPort: 80
  healthCheck:
    path: /healthz
    port: 8080
"#,
        );
        let issues = validator().validate(&doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "spec.healthCheck.port");
    }

    #[test]
    fn test_routing_hostnames_must_be_within_suffix() {
        let doc = parse(
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
  resources:
    size: S
  ports:
    - containerPort: 80
  routing:
    hostnames:
      - demo.apps.example.com
      - demo.elsewhere.net
"#,
        );
        let issues = validator().validate(&doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "spec.routing.hostnames[1]");
    }

    #[test]
    fn test_container_port_range() {
        let doc = parse(
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
  resources:
    size: S
  ports:
    - containerPort: 0
"#,
        );
        let issues = validator().validate(&doc);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "spec.ports[0].containerPort");
    }

    #[test]
    fn test_env_value_types_and_secret_refs_shape() {
        let doc = parse(
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
  resources:
    size: S
  ports:
    - containerPort: 80
  env:
    PORT: 80
    secretRefs:
      - name: TOKEN
"#,
        );
        let issues = validator().validate(&doc);
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"spec.env.PORT"));
        assert!(paths.contains(&"spec.env.secretRefs[0].secret"));
    }

    #[test]
    fn test_issue_display_includes_path() {
        let issue = SchemaIssue::new("spec.ports[0].containerPort", "must be in 1-65535, got 0");
        assert_eq!(
            issue.to_string(),
            "spec.ports[0].containerPort: must be in 1-65535, got 0"
        );
    }
}
