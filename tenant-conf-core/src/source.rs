//! Raw tenant configuration sources.
//!
//! The hosting platform stores each plugin's per-tenant configuration as a
//! text value under a key such as `PLUGIN_CONFIG_<plugin>`. A
//! [`TenantConfigSource`] is the capability to read that value; the cache
//! never talks to the platform directly.

use crate::{ConfResult, TenantId};
use dashmap::DashMap;

/// Source of raw (unparsed) per-tenant configuration text.
pub trait TenantConfigSource: Send + Sync {
    /// Fetch the raw configuration stored under `key` for a tenant.
    ///
    /// `Ok(None)` means the tenant has no configuration, which is not an
    /// error.
    fn tenant_configuration(&self, key: &str, tenant_id: TenantId) -> ConfResult<Option<String>>;
}

impl<F> TenantConfigSource for F
where
    F: Fn(&str, TenantId) -> Option<String> + Send + Sync,
{
    fn tenant_configuration(&self, key: &str, tenant_id: TenantId) -> ConfResult<Option<String>> {
        Ok(self(key, tenant_id))
    }
}

/// In-memory source, keyed by configuration key and tenant.
#[derive(Debug, Default)]
pub struct InMemoryTenantConfigSource {
    values: DashMap<(String, TenantId), String>,
}

impl InMemoryTenantConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw configuration, returning the previous value.
    pub fn put(
        &self,
        key: impl Into<String>,
        tenant_id: TenantId,
        raw: impl Into<String>,
    ) -> Option<String> {
        self.values.insert((key.into(), tenant_id), raw.into())
    }

    pub fn remove(&self, key: &str, tenant_id: TenantId) -> Option<String> {
        self.values
            .remove(&(key.to_string(), tenant_id))
            .map(|(_, raw)| raw)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TenantConfigSource for InMemoryTenantConfigSource {
    fn tenant_configuration(&self, key: &str, tenant_id: TenantId) -> ConfResult<Option<String>> {
        Ok(self
            .values
            .get(&(key.to_string(), tenant_id))
            .map(|raw| raw.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_put_get_remove() {
        let source = InMemoryTenantConfigSource::new();
        let tenant = TenantId::new_random();
        assert!(source.is_empty());

        assert!(source.put("PLUGIN_CONFIG_stripe", tenant, "a: {}").is_none());
        assert_eq!(
            source
                .tenant_configuration("PLUGIN_CONFIG_stripe", tenant)
                .expect("lookup should succeed"),
            Some("a: {}".to_string())
        );
        assert_eq!(source.len(), 1);

        assert_eq!(
            source.remove("PLUGIN_CONFIG_stripe", tenant),
            Some("a: {}".to_string())
        );
        assert!(source
            .tenant_configuration("PLUGIN_CONFIG_stripe", tenant)
            .expect("lookup should succeed")
            .is_none());
    }

    #[test]
    fn test_in_memory_scopes_by_key_and_tenant() {
        let source = InMemoryTenantConfigSource::new();
        let tenant_a = TenantId::new_random();
        let tenant_b = TenantId::new_random();
        source.put("PLUGIN_CONFIG_stripe", tenant_a, "x");

        let lookup = |key: &str, tenant| {
            source
                .tenant_configuration(key, tenant)
                .expect("lookup should succeed")
        };
        assert!(lookup("PLUGIN_CONFIG_stripe", tenant_b).is_none());
        assert!(lookup("PLUGIN_CONFIG_adyen", tenant_a).is_none());
    }

    #[test]
    fn test_closure_source() {
        let tenant = TenantId::new_random();
        let source = move |key: &str, id: TenantId| {
            (id == tenant).then(|| format!("{}: {{}}", key))
        };
        assert_eq!(
            source.tenant_configuration("k", tenant).expect("lookup should succeed"),
            Some("k: {}".to_string())
        );
        assert!(source
            .tenant_configuration("k", TenantId::new_random())
            .expect("lookup should succeed")
            .is_none());
    }
}
