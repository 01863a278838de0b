//! tenant-conf Test Utilities
//!
//! Centralized test infrastructure for the tenant-conf workspace:
//! - Mock configuration sources with call-count instrumentation
//! - A `tracing` layer that captures log events for assertions
//! - Proptest generators for tenant ids and properties
//! - YAML fixtures for common scenarios

// Re-export core types for convenience
pub use tenant_conf_core::{
    ConfResult, ConfigSection, HandlerConfig, InMemoryTenantConfigSource, SourceError,
    TenantConfError, TenantConfigSource, TenantId,
};

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::EnvFilter;

// ============================================================================
// FIXTURES
// ============================================================================

/// Document with two sections, each owned by a different handler.
pub const TWO_SECTION_DOCUMENT: &str = "key1: {a: 1}\nkey2: {b: 2}\n";

/// Document with an unclosed flow mapping.
pub const MALFORMED_DOCUMENT: &str = "key1: {a: 1\nkey2: [\n";

/// Realistic payment plugin document.
pub const PAYMENTS_DOCUMENT: &str = r#"
payments:
  api_key: sk_test_123
  retries: 3
  sandbox: true
invoices:
  template: default
"#;

/// Plugin name used by fixtures.
pub const TEST_PLUGIN: &str = "test-plugin";

/// Tenant configuration key for [`TEST_PLUGIN`].
pub const TEST_TENANT_KEY: &str = "PLUGIN_CONFIG_test-plugin";

/// Handler config for [`TEST_PLUGIN`] reading `section`.
pub fn test_handler_config(section: &str) -> HandlerConfig {
    HandlerConfig::new(TEST_PLUGIN, section)
}

// ============================================================================
// MOCK SOURCES
// ============================================================================

/// In-memory source that counts fetches, optionally slowed down to widen
/// race windows in concurrency tests.
#[derive(Debug, Default)]
pub struct CountingSource {
    inner: InMemoryTenantConfigSource,
    calls: AtomicUsize,
    calls_by_tenant: DashMap<TenantId, usize>,
    delay: Option<Duration>,
}

impl CountingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` on every fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Store raw configuration for a tenant under `key`.
    pub fn put(&self, key: &str, tenant_id: TenantId, raw: &str) {
        self.inner.put(key, tenant_id, raw);
    }

    /// Store raw configuration for a tenant under [`TEST_TENANT_KEY`].
    pub fn put_test(&self, tenant_id: TenantId, raw: &str) {
        self.put(TEST_TENANT_KEY, tenant_id, raw);
    }

    /// Total number of fetches.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of fetches for one tenant.
    pub fn calls_for(&self, tenant_id: TenantId) -> usize {
        self.calls_by_tenant
            .get(&tenant_id)
            .map(|count| *count.value())
            .unwrap_or(0)
    }
}

impl TenantConfigSource for CountingSource {
    fn tenant_configuration(&self, key: &str, tenant_id: TenantId) -> ConfResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.calls_by_tenant.entry(tenant_id).or_insert(0) += 1;
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.inner.tenant_configuration(key, tenant_id)
    }
}

/// Source that always fails, counting attempts.
#[derive(Debug)]
pub struct FailingSource {
    reason: String,
    calls: AtomicUsize,
}

impl FailingSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TenantConfigSource for FailingSource {
    fn tenant_configuration(&self, key: &str, tenant_id: TenantId) -> ConfResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::Unavailable {
            key: key.to_string(),
            tenant_id,
            reason: self.reason.clone(),
        }
        .into())
    }
}

// ============================================================================
// LOG CAPTURE
// ============================================================================

/// A log event recorded by [`LogCapture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

/// `tracing` layer recording every event it sees.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with this layer installed as the thread's subscriber.
    ///
    /// Events emitted on other threads are not captured.
    pub fn capture<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Events at exactly `level`.
    pub fn at_level(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .collect()
    }

    /// Whether any event at `level` has a message containing `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.at_level(level)
            .iter()
            .any(|event| event.message.contains(needle))
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        };
        match self.events.lock() {
            Ok(mut events) => events.push(captured),
            Err(poisoned) => poisoned.into_inner().push(captured),
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: BTreeMap<String, String>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}

/// Install a global fmt subscriber writing through the test harness.
///
/// Honors `RUST_LOG`; defaults to `warn`. Safe to call from every test.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod strategies {
    use super::TenantId;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Strategy to generate random tenant ids.
    pub fn tenant_id_strategy() -> impl Strategy<Value = TenantId> {
        any::<[u8; 16]>().prop_map(|bytes| TenantId::new(uuid::Uuid::from_bytes(bytes)))
    }

    /// Strategy to generate dotted property names such as `org.plugin.key`.
    pub fn property_name_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..4).prop_map(|parts| parts.join("."))
    }

    /// Strategy to generate flat property sets.
    pub fn properties_strategy() -> impl Strategy<Value = HashMap<String, String>> {
        prop::collection::hash_map(property_name_strategy(), "[ -~]{0,12}", 0..12)
    }
}
