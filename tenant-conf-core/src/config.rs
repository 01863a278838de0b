//! Handler Configuration Module
//!
//! Construction-time settings for a tenant configuration handler: which
//! plugin it belongs to and which YAML section it reads. Settings can be
//! built in code or loaded from environment variables.

use crate::{ConfResult, ConfigError};

/// Prefix of the tenant key under which the hosting platform stores a
/// plugin's per-tenant configuration.
pub const TENANT_CONFIG_KEY_PREFIX: &str = "PLUGIN_CONFIG_";

/// Environment variable holding the plugin name.
pub const ENV_PLUGIN_NAME: &str = "TENANT_CONF_PLUGIN_NAME";

/// Environment variable holding the configuration section key.
pub const ENV_SECTION: &str = "TENANT_CONF_SECTION";

/// Settings for one tenant configuration handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Name of the plugin owning the configuration. Used for logging and to
    /// derive the tenant configuration key.
    pub plugin_name: String,

    /// Top-level YAML section this handler reads. Several handlers may share
    /// one document, each reading its own section.
    pub configuration_key: String,
}

impl HandlerConfig {
    /// Create a new handler config.
    pub fn new(plugin_name: impl Into<String>, configuration_key: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            configuration_key: configuration_key.into(),
        }
    }

    /// Set the plugin name.
    pub fn with_plugin_name(mut self, plugin_name: impl Into<String>) -> Self {
        self.plugin_name = plugin_name.into();
        self
    }

    /// Set the configuration section key.
    pub fn with_configuration_key(mut self, configuration_key: impl Into<String>) -> Self {
        self.configuration_key = configuration_key.into();
        self
    }

    /// Key under which the platform stores this plugin's tenant configuration.
    ///
    /// Example: plugin `stripe` → `PLUGIN_CONFIG_stripe`.
    pub fn tenant_config_key(&self) -> String {
        format!("{}{}", TENANT_CONFIG_KEY_PREFIX, self.plugin_name)
    }

    /// Check that both fields are present.
    pub fn validate(&self) -> ConfResult<()> {
        if self.plugin_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "plugin_name".to_string(),
            }
            .into());
        }
        if self.configuration_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "configuration_key".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Create HandlerConfig from environment variables.
    ///
    /// Environment variables:
    /// - `TENANT_CONF_PLUGIN_NAME`: plugin name (required)
    /// - `TENANT_CONF_SECTION`: YAML section key (required)
    pub fn from_env() -> ConfResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`HandlerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> ConfResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let plugin_name = lookup(ENV_PLUGIN_NAME)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: ENV_PLUGIN_NAME.to_string(),
            })?;

        let configuration_key = lookup(ENV_SECTION)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: ENV_SECTION.to_string(),
            })?;

        Ok(Self {
            plugin_name,
            configuration_key,
        })
    }
}
