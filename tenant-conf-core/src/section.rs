//! Configuration sections handed to configurable factories.
//!
//! A section is the sub-mapping of a tenant's YAML document owned by one
//! handler. Values stay as generic YAML values; factories either pick
//! individual keys through the typed accessors or deserialize the whole
//! section into their own `serde` type.

use crate::{properties_to_map, ConfResult, ConfigError};
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Ordered mapping of string keys to arbitrary YAML values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSection {
    entries: BTreeMap<String, Value>,
}

impl ConfigSection {
    /// Create an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a section from flat properties, keeping those under `prefix`
    /// (prefix stripped). Every value is a YAML string.
    pub fn from_properties<I, K, V>(properties: I, prefix: Option<&str>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        properties_to_map(properties, prefix)
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect()
    }

    /// Insert a value, returning the previous one for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a string value. Non-string values yield `None`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Get a boolean value. Accepts YAML booleans and the strings
    /// `"true"`/`"false"` (as produced by [`ConfigSection::from_properties`]).
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.entries.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get an integer value. Accepts YAML integers and numeric strings.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.entries.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get a floating point value. Accepts YAML numbers and numeric strings.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.entries.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert the section to a YAML mapping.
    pub fn to_mapping(&self) -> Mapping {
        self.entries
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), v.clone()))
            .collect()
    }

    /// Deserialize the whole section into a typed configuration.
    ///
    /// Fails with [`ConfigError::InvalidValue`] when the section does not
    /// match the shape of `D`.
    pub fn deserialize<D: DeserializeOwned>(&self) -> ConfResult<D> {
        serde_yaml::from_value(Value::Mapping(self.to_mapping())).map_err(|e| {
            ConfigError::InvalidValue {
                field: std::any::type_name::<D>().to_string(),
                value: format!("{} keys", self.entries.len()),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl FromIterator<(String, Value)> for ConfigSection {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, Value>> for ConfigSection {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }
}

impl IntoIterator for ConfigSection {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct GatewayConfig {
        api_key: String,
        retries: u32,
        #[serde(default)]
        sandbox: bool,
    }

    fn gateway_section() -> ConfigSection {
        let mut section = ConfigSection::new();
        section.insert("api_key", "sk_test_123");
        section.insert("retries", 3);
        section.insert("sandbox", true);
        section
    }

    #[test]
    fn test_typed_accessors() {
        let section = gateway_section();
        assert_eq!(section.get_str("api_key"), Some("sk_test_123"));
        assert_eq!(section.get_i64("retries"), Some(3));
        assert_eq!(section.get_f64("retries"), Some(3.0));
        assert_eq!(section.get_bool("sandbox"), Some(true));
        assert_eq!(section.get_str("retries"), None);
        assert_eq!(section.get_i64("missing"), None);
    }

    #[test]
    fn test_accessors_parse_string_values() {
        let section = ConfigSection::from_properties(
            [("p.enabled", "true"), ("p.limit", "42"), ("p.rate", "0.5")],
            Some("p."),
        );
        assert_eq!(section.get_bool("enabled"), Some(true));
        assert_eq!(section.get_i64("limit"), Some(42));
        assert_eq!(section.get_f64("rate"), Some(0.5));
    }

    #[test]
    fn test_from_properties_keeps_prefixed_only() {
        let section = ConfigSection::from_properties(
            [("plugin.foo", "1"), ("plugin.bar", "2"), ("other", "3")],
            Some("plugin."),
        );
        assert_eq!(section.keys().collect::<Vec<_>>(), vec!["bar", "foo"]);
        assert!(!section.contains_key("other"));
    }

    #[test]
    fn test_deserialize_into_struct() {
        let config: GatewayConfig = gateway_section().deserialize().expect("should deserialize");
        assert_eq!(
            config,
            GatewayConfig {
                api_key: "sk_test_123".to_string(),
                retries: 3,
                sandbox: true,
            }
        );
    }

    #[test]
    fn test_deserialize_reports_shape_mismatch() {
        let mut section = ConfigSection::new();
        section.insert("retries", "many");
        let err = section.deserialize::<GatewayConfig>().unwrap_err();
        assert!(format!("{}", err).contains("GatewayConfig"));
    }

    #[test]
    fn test_empty_section() {
        let section = ConfigSection::new();
        assert!(section.is_empty());
        assert_eq!(section.len(), 0);
        assert!(section.to_mapping().is_empty());
    }
}
