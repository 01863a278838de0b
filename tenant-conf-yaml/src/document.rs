//! YAML document parsing.
//!
//! A tenant document is a YAML mapping from section names to mappings:
//!
//! ```yaml
//! payments:
//!   api_key: sk_live_123
//!   retries: 3
//! invoices:
//!   template: default
//! ```
//!
//! Every section must be a mapping (or empty), even those read by other
//! handlers; only the requested one is converted.

use serde_yaml::{Mapping, Value};
use tenant_conf_core::{ConfResult, ConfigSection, ParseError};

/// Parse a raw document and extract the section stored under `key`.
///
/// A missing section (or one written as `key:` with no body) yields an
/// empty section. Blank documents, documents that are not mappings, and
/// documents with any section that is not a mapping are parse errors.
pub fn parse_section(raw: &str, key: &str) -> ConfResult<ConfigSection> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyDocument.into());
    }

    let document: Value = serde_yaml::from_str(raw).map_err(|e| ParseError::Yaml {
        reason: e.to_string(),
    })?;

    let sections = match document {
        Value::Mapping(sections) => sections,
        Value::Null => return Err(ParseError::EmptyDocument.into()),
        other => {
            return Err(ParseError::NotAMapping {
                found: value_kind(&other).to_string(),
            }
            .into())
        }
    };

    for (name, body) in &sections {
        if !matches!(body, Value::Mapping(_) | Value::Null) {
            return Err(ParseError::InvalidSection {
                section: section_name(name),
                found: value_kind(body).to_string(),
            }
            .into());
        }
    }

    match sections.get(key) {
        Some(Value::Mapping(entries)) => section_from_mapping(key, entries),
        _ => Ok(ConfigSection::new()),
    }
}

fn section_name(name: &Value) -> String {
    match name {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => value_kind(other).to_string(),
    }
}

/// Convert a section mapping, turning scalar keys into strings.
fn section_from_mapping(section: &str, entries: &Mapping) -> ConfResult<ConfigSection> {
    entries
        .iter()
        .map(|(k, v)| -> ConfResult<(String, Value)> {
            let key = match k {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(ParseError::InvalidKey {
                        section: section.to_string(),
                        found: value_kind(other).to_string(),
                    }
                    .into())
                }
            };
            Ok((key, v.clone()))
        })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    const RESERVED: &[&str] = &["true", "false", "null", "inf", "infinity", "nan"];

    fn word(pattern: &'static str) -> impl Strategy<Value = String> {
        pattern.prop_filter("YAML reserved scalar", |s| !RESERVED.contains(&s.as_str()))
    }

    proptest! {
        /// Property: a section written as a flow mapping of simple string
        /// pairs parses back to exactly those pairs, whatever the sibling
        /// mapping holds.
        #[test]
        fn prop_section_entries_survive(
            entries in prop::collection::btree_map(word("[a-z][a-z0-9_]{0,8}"), word("[a-z][a-z0-9]{0,8}"), 0..8),
            sibling in prop::collection::btree_map(word("[a-z]{1,6}"), word("[a-z]{1,6}"), 0..4),
        ) {
            let render = |m: &BTreeMap<String, String>| {
                let body: Vec<String> = m.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                format!("{{{}}}", body.join(", "))
            };
            let raw = format!("mine: {}\ntheirs: {}\n", render(&entries), render(&sibling));

            let section = parse_section(&raw, "mine").expect("generated document should parse");
            prop_assert_eq!(section.len(), entries.len());
            for (k, v) in &entries {
                prop_assert_eq!(section.get_str(k), Some(v.as_str()));
            }
        }
    }
}
