use slipway_core::domain::DOMAIN_SUFFIX_TOKEN;
use slipway_core::manifest::{Manifest, Source};

use crate::compose::{ComposeDescriptor, ComposeService};
use crate::registry::SubdomainRegistry;

/// Capabilities that are never grantable through a manifest, compared
/// case-insensitively and with an optional `CAP_` prefix stripped.
pub const DANGEROUS_CAPABILITIES: &[&str] = &[
    "ALL",
    "SYS_ADMIN",
    "SYS_PTRACE",
    "SYS_MODULE",
    "SYS_RAWIO",
    "SYS_BOOT",
    "NET_ADMIN",
    "DAC_READ_SEARCH",
    "DAC_OVERRIDE",
    "SETUID",
    "SETGID",
];

/// Every deny rule the engine can fire. The policy gate is a trust
/// boundary: the full rule set must stay enumerable and each rule
/// independently testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyRule {
    Privileged,
    HostNetwork,
    HostPid,
    HostIpc,
    HostUserns,
    DangerousCapability,
    HostDevice,
    UnconfinedSecurityOpt,
    SysctlOverride,
    CgroupParent,
    ReservedName,
    BlockedPrefix,
    SuffixCollision,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    pub rule: DenyRule,
    pub message: String,
}

impl PolicyViolation {
    fn new(rule: DenyRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Warn rules annotate a manifest but never block it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarnRule {
    MissingHealthCheck,
    MutableImageTag,
    DefaultBranch,
    LargeResourceSize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyWarning {
    pub rule: WarnRule,
    pub message: String,
}

impl PolicyWarning {
    fn new(rule: WarnRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PolicyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PolicyReport {
    pub deny: Vec<PolicyViolation>,
    pub warn: Vec<PolicyWarning>,
}

impl PolicyReport {
    pub fn is_admissible(&self) -> bool {
        self.deny.is_empty()
    }
}

/// Deny/warn rule evaluation over an already well-formed manifest.
///
/// All rules are evaluated without short-circuiting so one report carries
/// every violation. Absent optional sections never fire a rule; only an
/// explicit dangerous value does.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    registry: SubdomainRegistry,
}

impl PolicyEngine {
    pub fn new(registry: SubdomainRegistry) -> Self {
        Self { registry }
    }

    pub fn evaluate(&self, manifest: &Manifest, compose: Option<&ComposeDescriptor>) -> PolicyReport {
        let mut report = PolicyReport::default();

        self.check_naming(manifest, &mut report);
        if let Some(compose) = compose {
            for (service_name, service) in &compose.services {
                self.check_service_security(service_name, service, &mut report);
            }
        }
        self.check_warnings(manifest, &mut report);

        report
    }

    fn check_naming(&self, manifest: &Manifest, report: &mut PolicyReport) {
        let name = manifest.name();

        if self.registry.is_reserved(name) {
            report.deny.push(PolicyViolation::new(
                DenyRule::ReservedName,
                format!("name \"{name}\" is reserved"),
            ));
        }

        if let Some(prefix) = self.registry.matches_blocked_prefix(name) {
            report.deny.push(PolicyViolation::new(
                DenyRule::BlockedPrefix,
                format!("name \"{name}\" matches blocked prefix \"{prefix}\""),
            ));
        }

        if name.to_lowercase().ends_with(DOMAIN_SUFFIX_TOKEN) {
            report.deny.push(PolicyViolation::new(
                DenyRule::SuffixCollision,
                format!(
                    "name \"{name}\" ends with the platform suffix token \"{DOMAIN_SUFFIX_TOKEN}\" and would produce a double-suffixed domain"
                ),
            ));
        }
    }

    fn check_service_security(
        &self,
        service_name: &str,
        service: &ComposeService,
        report: &mut PolicyReport,
    ) {
        if service.is_privileged() {
            report.deny.push(PolicyViolation::new(
                DenyRule::Privileged,
                format!("service \"{service_name}\" requests privileged mode"),
            ));
        }

        let host_namespaces: [(DenyRule, &Option<String>, &str); 4] = [
            (DenyRule::HostNetwork, &service.network_mode, "network_mode"),
            (DenyRule::HostPid, &service.pid, "pid"),
            (DenyRule::HostIpc, &service.ipc, "ipc"),
            (DenyRule::HostUserns, &service.userns_mode, "userns_mode"),
        ];
        for (rule, value, field) in host_namespaces {
            if value.as_deref() == Some("host") {
                report.deny.push(PolicyViolation::new(
                    rule,
                    format!("service \"{service_name}\" sets {field}: host"),
                ));
            }
        }

        for cap in &service.cap_add {
            let normalized = cap.to_uppercase();
            let normalized = normalized.strip_prefix("CAP_").unwrap_or(&normalized);
            if DANGEROUS_CAPABILITIES.contains(&normalized) {
                report.deny.push(PolicyViolation::new(
                    DenyRule::DangerousCapability,
                    format!("service \"{service_name}\" adds dangerous capability {cap}"),
                ));
            }
        }

        if !service.devices.is_empty() {
            report.deny.push(PolicyViolation::new(
                DenyRule::HostDevice,
                format!("service \"{service_name}\" binds host devices"),
            ));
        }

        for opt in &service.security_opt {
            if opt.to_lowercase().contains("unconfined") {
                report.deny.push(PolicyViolation::new(
                    DenyRule::UnconfinedSecurityOpt,
                    format!("service \"{service_name}\" disables confinement via security_opt \"{opt}\""),
                ));
            }
        }

        if service.sysctls.as_ref().is_some_and(|s| !s.is_empty()) {
            report.deny.push(PolicyViolation::new(
                DenyRule::SysctlOverride,
                format!("service \"{service_name}\" overrides sysctls"),
            ));
        }

        if service
            .cgroup_parent
            .as_ref()
            .is_some_and(|c| !c.trim().is_empty())
        {
            report.deny.push(PolicyViolation::new(
                DenyRule::CgroupParent,
                format!("service \"{service_name}\" overrides cgroup_parent"),
            ));
        }
    }

    fn check_warnings(&self, manifest: &Manifest, report: &mut PolicyReport) {
        if manifest.spec.health_check.is_none() {
            report.warn.push(PolicyWarning::new(
                WarnRule::MissingHealthCheck,
                "no health check declared; the platform cannot verify rollouts",
            ));
        }

        match &manifest.spec.source {
            Source::Docker(docker) => {
                let tag = docker.tag.as_deref().unwrap_or_default();
                if tag.is_empty() || tag == "latest" {
                    report.warn.push(PolicyWarning::new(
                        WarnRule::MutableImageTag,
                        format!(
                            "image \"{}\" uses a mutable tag; deployments are not reproducible",
                            docker.image_ref()
                        ),
                    ));
                }
            }
            Source::Github(github) => {
                if matches!(github.branch.as_str(), "main" | "master") {
                    report.warn.push(PolicyWarning::new(
                        WarnRule::DefaultBranch,
                        format!(
                            "tracking default branch \"{}\"; prefer a release branch",
                            github.branch
                        ),
                    ));
                }
            }
        }

        if manifest.spec.resources.size.is_large() {
            report.warn.push(PolicyWarning::new(
                WarnRule::LargeResourceSize,
                "size L reserves a large share of the shared project quota",
            ));
        }
    }
}
