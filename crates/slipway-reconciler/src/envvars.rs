use slipway_core::manifest::EnvSpec;

use crate::settings::SecretStore;

/// Result of merging static values with resolved secret references.
#[derive(Debug, Clone, Default)]
pub struct ResolvedEnvironment {
    /// Newline-delimited `KEY=VALUE` blob in declaration order, statics
    /// first, then resolved secrets.
    pub blob: String,
    /// One warning per secretRef missing from the namespace.
    pub warnings: Vec<String>,
}

/// Merges static key/value pairs with resolved secretRefs.
///
/// A missing secret is a warning, never a failure: the variable is simply
/// omitted and the owner is told which key to provision.
pub fn resolve_environment(env: &EnvSpec, secrets: &SecretStore) -> ResolvedEnvironment {
    let mut lines: Vec<String> = Vec::new();
    let mut warnings = Vec::new();

    for (key, value) in &env.values {
        lines.push(format!("{key}={value}"));
    }

    for secret_ref in &env.secret_refs {
        match secrets.resolve(&secret_ref.secret) {
            Some(value) => lines.push(format!("{}={value}", secret_ref.name)),
            None => warnings.push(format!(
                "secret \"{}\" for {} is not set in the secret namespace (SECRET_{})",
                secret_ref.secret, secret_ref.name, secret_ref.secret
            )),
        }
    }

    ResolvedEnvironment {
        blob: lines.join("\n"),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipway_core::manifest::SecretRef;

    fn env_spec() -> EnvSpec {
        let mut env = EnvSpec::default();
        env.values.insert("LOG_LEVEL".into(), "info".into());
        env.values.insert("PORT".into(), "3000".into());
        env.secret_refs.push(SecretRef {
            name: "DATABASE_URL".into(),
            secret: "db_url".into(),
        });
        env
    }

    #[test]
    fn test_blob_is_deterministic_declaration_order() {
        let secrets = SecretStore::from_pairs([("db_url", "postgres://db")]);
        let resolved = resolve_environment(&env_spec(), &secrets);
        assert_eq!(
            resolved.blob,
            "LOG_LEVEL=info\nPORT=3000\nDATABASE_URL=postgres://db"
        );
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_missing_secret_warns_and_omits() {
        let resolved = resolve_environment(&env_spec(), &SecretStore::default());
        assert_eq!(resolved.blob, "LOG_LEVEL=info\nPORT=3000");
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("SECRET_db_url"));
    }

    #[test]
    fn test_empty_spec_renders_empty_blob() {
        let resolved = resolve_environment(&EnvSpec::default(), &SecretStore::default());
        assert!(resolved.blob.is_empty());
        assert!(resolved.warnings.is_empty());
    }
}
