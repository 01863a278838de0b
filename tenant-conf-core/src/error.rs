//! Error types for tenant configuration operations

use crate::TenantId;
use thiserror::Error;

/// Errors raised while turning raw configuration text into a section.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed YAML: {reason}")]
    Yaml { reason: String },

    #[error("Configuration document is empty")]
    EmptyDocument,

    #[error("Configuration document must be a mapping, found {found}")]
    NotAMapping { found: String },

    #[error("Section {section} must be a mapping, found {found}")]
    InvalidSection { section: String, found: String },

    #[error("Section {section} has a non-scalar key: {found}")]
    InvalidKey { section: String, found: String },
}

/// Errors raised by a raw configuration source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Configuration {key} unavailable for tenant {tenant_id}: {reason}")]
    Unavailable {
        key: String,
        tenant_id: TenantId,
        reason: String,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all tenant configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TenantConfError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for tenant configuration operations.
pub type ConfResult<T> = Result<T, TenantConfError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_parse_error_display_invalid_section() {
        let err = ParseError::InvalidSection {
            section: "payments".to_string(),
            found: "sequence".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("payments"));
        assert!(msg.contains("sequence"));
    }

    #[test]
    fn test_source_error_display_unavailable() {
        let err = SourceError::Unavailable {
            key: "PLUGIN_CONFIG_stripe".to_string(),
            tenant_id: TenantId::new(Uuid::nil()),
            reason: "timeout".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("PLUGIN_CONFIG_stripe"));
        assert!(msg.contains("00000000-0000-0000-0000-000000000000"));
        assert!(msg.contains("timeout"));
    }

    #[test]
    fn test_config_error_display_missing_required() {
        let err = ConfigError::MissingRequired {
            field: "plugin_name".to_string(),
        };
        assert!(format!("{}", err).contains("plugin_name"));
    }

    #[test]
    fn test_master_error_from_parse() {
        let err: TenantConfError = ParseError::EmptyDocument.into();
        assert!(matches!(err, TenantConfError::Parse(ParseError::EmptyDocument)));
        assert!(format!("{}", err).starts_with("Parse error"));
    }
}
