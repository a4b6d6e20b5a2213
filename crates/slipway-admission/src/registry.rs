use std::collections::HashSet;

/// Reserved-name and blocked-prefix registry for subdomain tokens.
///
/// Loaded once per run from settings and injected read-only, so the gate can
/// be tested against fixture registries. Lookups are case-folded; the
/// registry itself is externally maintained.
#[derive(Debug, Clone, Default)]
pub struct SubdomainRegistry {
    reserved: HashSet<String>,
    blocked_prefixes: Vec<String>,
}

impl SubdomainRegistry {
    pub fn new(
        reserved: impl IntoIterator<Item = impl Into<String>>,
        blocked_prefixes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            reserved: reserved
                .into_iter()
                .map(|r| r.into().to_lowercase())
                .collect(),
            blocked_prefixes: blocked_prefixes
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .collect(),
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(&name.to_lowercase())
    }

    /// Returns the first blocked prefix the name falls under, if any.
    pub fn matches_blocked_prefix(&self, name: &str) -> Option<&str> {
        let folded = name.to_lowercase();
        self.blocked_prefixes
            .iter()
            .find(|prefix| folded.starts_with(prefix.as_str()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty() && self.blocked_prefixes.is_empty()
    }
}
