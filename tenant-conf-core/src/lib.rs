//! tenant-conf Core - Per-Tenant Configuration Types
//!
//! Shared building blocks for plugin configuration scoped to a tenant:
//! identity, the error taxonomy, handler settings, configuration sections,
//! the tenant-to-configurable map and the raw configuration source seam.
//!
//! This crate knows nothing about YAML documents or lookup caching; those
//! live in `tenant-conf-yaml`.

pub mod config;
pub mod configurable;
pub mod error;
pub mod identity;
pub mod properties;
pub mod section;
pub mod source;

pub use config::{HandlerConfig, ENV_PLUGIN_NAME, ENV_SECTION, TENANT_CONFIG_KEY_PREFIX};
pub use configurable::TenantConfigurable;
pub use error::{ConfResult, ConfigError, ParseError, SourceError, TenantConfError};
pub use identity::TenantId;
pub use properties::properties_to_map;
pub use section::ConfigSection;
pub use source::{InMemoryTenantConfigSource, TenantConfigSource};
