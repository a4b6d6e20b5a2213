use thiserror::Error;

/// Core error types for Slipway manifest handling
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Manifest parse error: {0}")]
    ManifestParse(#[from] serde_yaml::Error),

    #[error("Unsupported apiVersion: {0}")]
    UnsupportedApiVersion(String),

    #[error("Unsupported kind: {0}")]
    UnsupportedKind(String),

    #[error("Invalid application name: {name}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new UnsupportedApiVersion error
    pub fn unsupported_api_version(version: impl Into<String>) -> Self {
        Self::UnsupportedApiVersion(version.into())
    }

    /// Create a new UnsupportedKind error
    pub fn unsupported_kind(kind: impl Into<String>) -> Self {
        Self::UnsupportedKind(kind.into())
    }

    /// Create a new InvalidName error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidManifest error
    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            message: message.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is recoverable by editing the manifest
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            Self::ManifestParse(_)
                | Self::UnsupportedApiVersion(_)
                | Self::UnsupportedKind(_)
                | Self::InvalidName { .. }
                | Self::InvalidManifest { .. }
                | Self::JsonError(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ManifestParse(_) | Self::JsonError(_) => ErrorCategory::Parse,
            Self::UnsupportedApiVersion(_)
            | Self::UnsupportedKind(_)
            | Self::InvalidName { .. }
            | Self::InvalidManifest { .. } => ErrorCategory::Validation,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Parse,
    Validation,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::Validation => write!(f, "validation"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CoreError::unsupported_api_version("v2");
        assert_eq!(err.to_string(), "Unsupported apiVersion: v2");
        assert!(err.is_manifest_error());
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_invalid_name_error() {
        let err = CoreError::invalid_name("Admin", "must be lowercase");
        assert_eq!(
            err.to_string(),
            "Invalid application name: Admin: must be lowercase"
        );
        assert!(err.is_manifest_error());
    }

    #[test]
    fn test_parse_error_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("{ unclosed").unwrap_err();
        let core_err: CoreError = yaml_err.into();
        assert!(matches!(core_err, CoreError::ManifestParse(_)));
        assert_eq!(core_err.category(), ErrorCategory::Parse);
    }

    #[test]
    fn test_configuration_error_category() {
        let err = CoreError::configuration("missing domain suffix");
        assert!(!err.is_manifest_error());
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(ErrorCategory::Configuration.to_string(), "configuration");
    }
}
