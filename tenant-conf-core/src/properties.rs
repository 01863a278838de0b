//! Flat property helpers.

use std::collections::HashMap;

/// Select the properties whose names start with `prefix` and strip it.
///
/// With no prefix every property is kept unchanged. The result maps the
/// stripped name to its value.
///
/// ```
/// use std::collections::HashMap;
/// use tenant_conf_core::properties_to_map;
///
/// let properties = HashMap::from([
///     ("plugin.foo", "1"),
///     ("plugin.bar", "2"),
///     ("other", "3"),
/// ]);
/// let map = properties_to_map(properties, Some("plugin."));
/// assert_eq!(map.len(), 2);
/// assert_eq!(map["foo"], "1");
/// assert_eq!(map["bar"], "2");
/// ```
pub fn properties_to_map<I, K, V>(properties: I, prefix: Option<&str>) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    properties
        .into_iter()
        .filter_map(|(name, value)| {
            let name = name.as_ref();
            let stripped = match prefix {
                Some(prefix) => name.strip_prefix(prefix)?,
                None => name,
            };
            Some((stripped.to_string(), value.into()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_filters_and_strips() {
        let properties = vec![
            ("plugin.foo".to_string(), "1".to_string()),
            ("plugin.bar".to_string(), "2".to_string()),
            ("other".to_string(), "3".to_string()),
        ];
        let map = properties_to_map(properties, Some("plugin."));

        let expected: HashMap<String, String> = [("foo", "1"), ("bar", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(map, expected);
    }

    #[test]
    fn test_no_prefix_keeps_everything() {
        let map = properties_to_map([("a.b", "1"), ("c", "2")], None);
        assert_eq!(map.len(), 2);
        assert_eq!(map["a.b"], "1");
        assert_eq!(map["c"], "2");
    }

    #[test]
    fn test_exact_prefix_match_yields_empty_key() {
        let map = properties_to_map([("plugin.", "x")], Some("plugin."));
        assert_eq!(map.get(""), Some(&"x".to_string()));
    }

    #[test]
    fn test_empty_input() {
        let map = properties_to_map(Vec::<(String, String)>::new(), Some("plugin."));
        assert!(map.is_empty());
    }
}
