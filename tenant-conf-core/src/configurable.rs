//! Tenant-to-configurable map with a default fallback.

use crate::TenantId;
use dashmap::DashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Configurables keyed by tenant, plus one default used for the global
/// scope and for tenants without a value of their own.
///
/// Values are shared as `Arc<T>` and never mutated in place; `put` replaces.
#[derive(Debug)]
pub struct TenantConfigurable<T> {
    by_tenant: DashMap<TenantId, Arc<T>>,
    default: RwLock<Option<Arc<T>>>,
}

impl<T> TenantConfigurable<T> {
    pub fn new() -> Self {
        Self {
            by_tenant: DashMap::new(),
            default: RwLock::new(None),
        }
    }

    /// Resolve the configurable for a tenant.
    ///
    /// `None` resolves straight to the default. A tenant without its own
    /// value also gets the default, which may itself be unset.
    pub fn get(&self, tenant_id: Option<TenantId>) -> Option<Arc<T>> {
        if let Some(tenant_id) = tenant_id {
            if let Some(value) = self.by_tenant.get(&tenant_id) {
                return Some(Arc::clone(value.value()));
            }
        }
        self.default_configurable()
    }

    /// Store the configurable for a tenant, returning the one it replaces.
    pub fn put(&self, tenant_id: TenantId, configurable: T) -> Option<Arc<T>> {
        self.by_tenant.insert(tenant_id, Arc::new(configurable))
    }

    pub fn default_configurable(&self) -> Option<Arc<T>> {
        self.read_default().clone()
    }

    /// Replace the default configurable.
    pub fn set_default(&self, default: T) {
        *self.write_default() = Some(Arc::new(default));
    }

    fn read_default(&self) -> RwLockReadGuard<'_, Option<Arc<T>>> {
        match self.default.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Default configurable lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_default(&self) -> RwLockWriteGuard<'_, Option<Arc<T>>> {
        match self.default.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("Default configurable lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl<T> Default for TenantConfigurable<T> {
    fn default() -> Self {
        Self::new()
    }
}
