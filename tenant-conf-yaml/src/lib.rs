//! tenant-conf YAML - Per-Tenant Plugin Configuration Cache
//!
//! Each tenant of the hosting platform may carry a YAML document for a
//! plugin. The document's top level maps section names to mappings; a
//! handler owns one section. [`TenantConfigCache`] reads a tenant's
//! document on first lookup, extracts its section, builds a typed
//! configurable through a [`ConfigurableFactory`] and keeps the result for
//! the life of the process.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tenant_conf_core::{ConfigSection, HandlerConfig, InMemoryTenantConfigSource, TenantId};
//! use tenant_conf_yaml::TenantConfigCache;
//!
//! let source = Arc::new(InMemoryTenantConfigSource::new());
//! let tenant = TenantId::new_random();
//! source.put("PLUGIN_CONFIG_stripe", tenant, "payments:\n  retries: 5\n");
//!
//! let cache = TenantConfigCache::new(
//!     HandlerConfig::new("stripe", "payments"),
//!     source,
//!     |section: &ConfigSection| section.get_i64("retries").unwrap_or(1),
//! );
//! cache.set_default_configurable(1);
//!
//! assert_eq!(cache.get_configurable(Some(tenant)).as_deref(), Some(&5));
//! assert_eq!(cache.get_configurable(None).as_deref(), Some(&1));
//! ```

pub mod cache;
pub mod document;
pub mod factory;

pub use cache::{CacheStats, TenantConfigCache};
pub use document::parse_section;
pub use factory::ConfigurableFactory;
