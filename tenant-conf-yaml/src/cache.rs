//! Per-tenant configurable cache.
//!
//! Lookups for a tenant that has not been seen yet fetch the tenant's raw
//! document, parse the handler's section and build the configurable. The
//! result (including "nothing to build") is remembered, so each tenant is
//! initialized at most once for the life of the cache.
//!
//! # Concurrency
//!
//! Initialization is double-checked. The fast path is a lock-free
//! membership test on the set of initialized tenants. On a miss, the caller
//! takes a mutex dedicated to that tenant and tests again before doing any
//! work, so concurrent first lookups of one tenant configure it once while
//! first lookups of different tenants proceed in parallel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::{DashMap, DashSet};
use tenant_conf_core::{
    ConfResult, ConfigSection, HandlerConfig, TenantConfigSource, TenantConfigurable, TenantId,
};

use crate::document::parse_section;
use crate::factory::ConfigurableFactory;

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of `get_configurable` calls.
    pub lookups: u64,
    /// Lookups answered without initializing a tenant.
    pub hits: u64,
    /// Number of times raw configuration was requested from the source.
    pub configure_runs: u64,
    /// Number of configurables built and stored.
    pub configured: u64,
    /// Fetches that found no raw configuration.
    pub missing_raw: u64,
    /// Documents that failed to parse.
    pub parse_failures: u64,
    /// Fetches that failed in the source.
    pub source_failures: u64,
    /// Tenants whose lookup-driven initialization has run.
    pub initialized_tenants: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    lookups: AtomicU64,
    hits: AtomicU64,
    configure_runs: AtomicU64,
    configured: AtomicU64,
    missing_raw: AtomicU64,
    parse_failures: AtomicU64,
    source_failures: AtomicU64,
}

/// Lazily built, per-tenant configurables for one plugin section.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tenant_conf_core::{ConfigSection, HandlerConfig, InMemoryTenantConfigSource, TenantId};
/// use tenant_conf_yaml::TenantConfigCache;
///
/// let source = Arc::new(InMemoryTenantConfigSource::new());
/// let tenant_id = TenantId::new_random();
/// source.put("PLUGIN_CONFIG_stripe", tenant_id, "payments: {retries: 5}\n");
///
/// let cache = TenantConfigCache::new(
///     HandlerConfig::new("stripe", "payments"),
///     source,
///     |section: &ConfigSection| section.get_i64("retries").unwrap_or(3),
/// );
/// cache.set_default_configurable(3);
///
/// // First call for a tenant parses its document; later calls are cached.
/// assert_eq!(cache.get_configurable(Some(tenant_id)).as_deref(), Some(&5));
/// assert_eq!(cache.get_configurable(None).as_deref(), Some(&3));
/// ```
pub struct TenantConfigCache<T> {
    config: HandlerConfig,
    source: Arc<dyn TenantConfigSource>,
    factory: Box<dyn ConfigurableFactory<T>>,
    configurables: TenantConfigurable<T>,
    /// Tenants whose initialization has run. Only grows.
    configured_tenants: DashSet<TenantId>,
    /// Per-tenant initialization locks, dropped once the tenant is in
    /// `configured_tenants`.
    init_guards: DashMap<TenantId, Arc<Mutex<()>>>,
    counters: Counters,
}

impl<T> TenantConfigCache<T> {
    /// Create a cache reading `config.configuration_key` from documents
    /// provided by `source`.
    pub fn new<F>(config: HandlerConfig, source: Arc<dyn TenantConfigSource>, factory: F) -> Self
    where
        F: ConfigurableFactory<T> + 'static,
    {
        Self {
            config,
            source,
            factory: Box::new(factory),
            configurables: TenantConfigurable::new(),
            configured_tenants: DashSet::new(),
            init_guards: DashMap::new(),
            counters: Counters::default(),
        }
    }

    /// Like [`TenantConfigCache::new`], rejecting a config with a blank
    /// plugin name or section key.
    pub fn try_new<F>(
        config: HandlerConfig,
        source: Arc<dyn TenantConfigSource>,
        factory: F,
    ) -> ConfResult<Self>
    where
        F: ConfigurableFactory<T> + 'static,
    {
        config.validate()?;
        Ok(Self::new(config, source, factory))
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn plugin_name(&self) -> &str {
        &self.config.plugin_name
    }

    /// The YAML section this cache reads.
    pub fn configuration_key(&self) -> &str {
        &self.config.configuration_key
    }

    /// Replace the value returned for the global scope and for tenants
    /// without their own configuration.
    pub fn set_default_configurable(&self, default: T) {
        self.configurables.set_default(default);
    }

    /// Build the default from flat properties (prefix stripped) and install it.
    pub fn configure_default_from_properties<I, K, V>(&self, properties: I, prefix: Option<&str>)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let section = ConfigSection::from_properties(properties, prefix);
        let default = self.factory.create_configurable(&section);
        self.configurables.set_default(default);
        tracing::debug!(
            plugin = %self.config.plugin_name,
            keys = section.len(),
            "Default configurable built from properties"
        );
    }

    /// Resolve the configurable for a tenant, initializing it on first use.
    ///
    /// Returns the tenant's own configurable if one was built, otherwise the
    /// default, which is `None` until a default has been set. `None` as the
    /// tenant selects the global scope and never touches the source.
    pub fn get_configurable(&self, tenant_id: Option<TenantId>) -> Option<Arc<T>> {
        self.counters.lookups.fetch_add(1, Ordering::Relaxed);

        match tenant_id {
            Some(tenant_id) if !self.configured_tenants.contains(&tenant_id) => {
                self.initialize(tenant_id);
            }
            _ => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.configurables.get(tenant_id)
    }

    /// Whether lookup-driven initialization has run for the tenant.
    pub fn is_configured(&self, tenant_id: TenantId) -> bool {
        self.configured_tenants.contains(&tenant_id)
    }

    /// Fetch, parse and build the tenant's configurable, replacing any
    /// previous one.
    ///
    /// Missing raw configuration leaves the tenant as it is. Source and parse
    /// failures are logged and leave the tenant as it is. Does not mark the
    /// tenant as initialized; lookups do that.
    pub fn configure(&self, tenant_id: Option<TenantId>) {
        let Some(tenant_id) = tenant_id else {
            return;
        };

        self.counters.configure_runs.fetch_add(1, Ordering::Relaxed);
        let key = self.config.tenant_config_key();

        let raw = match self.source.tenant_configuration(&key, tenant_id) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.counters.missing_raw.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    plugin = %self.config.plugin_name,
                    tenant_id = %tenant_id,
                    "No tenant configuration, using default"
                );
                return;
            }
            Err(e) => {
                self.counters.source_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    plugin = %self.config.plugin_name,
                    tenant_id = %tenant_id,
                    error = %e,
                    "Error while fetching tenant configuration"
                );
                return;
            }
        };

        let section = match parse_section(&raw, &self.config.configuration_key) {
            Ok(section) => section,
            Err(e) => {
                self.counters.parse_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    plugin = %self.config.plugin_name,
                    tenant_id = %tenant_id,
                    section = %self.config.configuration_key,
                    error = %e,
                    "Error while parsing YAML configuration"
                );
                return;
            }
        };

        let configurable = self.factory.create_configurable(&section);
        self.configurables.put(tenant_id, configurable);
        self.counters.configured.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            plugin = %self.config.plugin_name,
            tenant_id = %tenant_id,
            section = %self.config.configuration_key,
            keys = section.len(),
            "Tenant configured"
        );
    }

    pub fn stats(&self) -> CacheStats {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        CacheStats {
            lookups: load(&self.counters.lookups),
            hits: load(&self.counters.hits),
            configure_runs: load(&self.counters.configure_runs),
            configured: load(&self.counters.configured),
            missing_raw: load(&self.counters.missing_raw),
            parse_failures: load(&self.counters.parse_failures),
            source_failures: load(&self.counters.source_failures),
            initialized_tenants: self.configured_tenants.len() as u64,
        }
    }

    /// Slow path of `get_configurable`: configure the tenant once.
    fn initialize(&self, tenant_id: TenantId) {
        let guard = Arc::clone(self.init_guards.entry(tenant_id).or_default().value());
        let _lock = lock_recovering(&guard);

        // Another caller may have finished while we waited.
        if self.configured_tenants.contains(&tenant_id) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            self.init_guards.remove(&tenant_id);
            return;
        }

        self.configure(Some(tenant_id));
        self.configured_tenants.insert(tenant_id);
        self.init_guards.remove(&tenant_id);
    }
}

/// Lock a guard mutex, recovering it if a previous holder panicked.
fn lock_recovering(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Tenant initialization lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
