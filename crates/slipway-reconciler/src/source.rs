//! Source-configuration strategy selection.
//!
//! The three git transports are mutually exclusive per application and are
//! chosen by a fixed, total precedence order over the owner's registered
//! capabilities, so a new transport slots into the table without touching
//! later reconciliation steps.

use slipway_core::manifest::GithubSource;

use crate::settings::ReconcilerSettings;

/// Git transport strategies in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStrategy {
    /// Organization-scoped integration identity (GitHub App).
    GithubApp,
    /// Organization-scoped private deploy key.
    DeployKey,
    /// Anonymous public transport; always applicable.
    PublicGit,
}

/// The fixed precedence table. First applicable entry wins.
const PRECEDENCE: &[SourceStrategy] = &[
    SourceStrategy::GithubApp,
    SourceStrategy::DeployKey,
    SourceStrategy::PublicGit,
];

impl SourceStrategy {
    fn applies(&self, owner: &str, settings: &ReconcilerSettings) -> bool {
        match self {
            Self::GithubApp => settings.has_github_app(owner),
            Self::DeployKey => settings.has_deploy_key(owner),
            Self::PublicGit => true,
        }
    }
}

/// Selects the transport for a repository source. Total: the anonymous
/// fallback always applies.
pub fn select_strategy(source: &GithubSource, settings: &ReconcilerSettings) -> SourceStrategy {
    PRECEDENCE
        .iter()
        .copied()
        .find(|strategy| strategy.applies(&source.owner, settings))
        .unwrap_or(SourceStrategy::PublicGit)
}
