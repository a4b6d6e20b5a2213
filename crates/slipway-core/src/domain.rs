use std::sync::OnceLock;

use regex::Regex;

/// Token the platform appends between the application name and the managed
/// domain suffix. Manifest names must never already end with it, otherwise
/// the derived host would be double-suffixed.
pub const DOMAIN_SUFFIX_TOKEN: &str = "-p";

static DNS_LABEL_RE: OnceLock<Regex> = OnceLock::new();

fn dns_label_re() -> &'static Regex {
    DNS_LABEL_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("static pattern compiles")
    })
}

/// Derives the canonical external hostname for an application.
///
/// The host is pinned to `metadata.name` for the application's lifetime and
/// is never changed once the domain has been created.
pub fn derive_host(name: &str, domain_suffix: &str) -> String {
    format!("{name}{DOMAIN_SUFFIX_TOKEN}.{domain_suffix}")
}

/// Checks the DNS-label contract for application names: lowercase
/// alphanumerics and hyphens, no leading/trailing hyphen, 3-63 chars.
pub fn is_dns_label(name: &str) -> bool {
    (3..=63).contains(&name.len()) && dns_label_re().is_match(name)
}

/// Whether a hostname lies within the managed domain suffix.
pub fn is_within_suffix(host: &str, domain_suffix: &str) -> bool {
    host.strip_suffix(domain_suffix)
        .is_some_and(|prefix| prefix.ends_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_host() {
        assert_eq!(
            derive_host("demo", "apps.example.com"),
            "demo-p.apps.example.com"
        );
    }

    #[test]
    fn test_dns_label_bounds() {
        assert!(is_dns_label("abc"));
        assert!(is_dns_label("my-app-2"));
        assert!(!is_dns_label("ab"));
        assert!(!is_dns_label(&"a".repeat(64)));
        assert!(is_dns_label(&"a".repeat(63)));
    }

    #[test]
    fn test_dns_label_charset() {
        assert!(!is_dns_label("My-App"));
        assert!(!is_dns_label("-leading"));
        assert!(!is_dns_label("trailing-"));
        assert!(!is_dns_label("under_score"));
        assert!(!is_dns_label("dotted.name"));
    }

    #[test]
    fn test_is_within_suffix() {
        assert!(is_within_suffix("demo-p.apps.example.com", "apps.example.com"));
        assert!(is_within_suffix("x.y.apps.example.com", "apps.example.com"));
        assert!(!is_within_suffix("apps.example.com", "apps.example.com"));
        assert!(!is_within_suffix("demo.example.com", "apps.example.com"));
        assert!(!is_within_suffix("evilapps.example.com", "apps.example.com"));
    }
}
