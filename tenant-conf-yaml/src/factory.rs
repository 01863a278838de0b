//! Configurable factories.
//!
//! The cache is agnostic to the configurable's shape; each plugin supplies
//! a factory that turns its section into a typed value.

use tenant_conf_core::ConfigSection;

/// Builds a typed configurable from a tenant's configuration section.
///
/// Implemented for any `Fn(&ConfigSection) -> T`, so plain closures and
/// functions can be passed to the cache directly.
pub trait ConfigurableFactory<T>: Send + Sync {
    /// Build the configurable. Called at most once per tenant by lookups,
    /// and once per explicit `configure` call.
    fn create_configurable(&self, section: &ConfigSection) -> T;
}

impl<T, F> ConfigurableFactory<T> for F
where
    F: Fn(&ConfigSection) -> T + Send + Sync,
{
    fn create_configurable(&self, section: &ConfigSection) -> T {
        self(section)
    }
}
