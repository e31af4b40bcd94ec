//! Case-insensitive property maps with typed accessors.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key-value properties attached to a node.
///
/// Keys are normalized to upper case when inserted, so every lookup is
/// case-insensitive. Values are trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, replacing any earlier value for the same key.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) {
        self.entries.insert(
            normalize_key(key.as_ref()),
            value.as_ref().trim().to_string(),
        );
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.insert(key, value);
        self
    }

    /// Raw value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&normalize_key(key)).map(String::as_str)
    }

    /// Value for `key` when present and not blank.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Check if a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    /// Boolean flag; `Ok(None)` when absent.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => parse_bool(raw)
                .map(Some)
                .ok_or_else(|| Error::invalid_value(key, raw)),
        }
    }

    /// Integer value; `Ok(None)` when absent or blank.
    pub fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.get_non_empty(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| Error::invalid_value(key, raw)),
        }
    }

    /// Floating-point value; `Ok(None)` when absent or blank.
    pub fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.get_non_empty(key) {
            None => Ok(None),
            Some(raw) => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(Error::invalid_value(key, raw)),
            },
        }
    }

    /// Iterate over `(KEY, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, String>> for Properties {
    fn from(map: BTreeMap<String, String>) -> Self {
        let mut props = Properties::new();
        for (k, v) in map {
            props.insert(k, v);
        }
        props
    }
}

impl From<Properties> for BTreeMap<String, String> {
    fn from(props: Properties) -> Self {
        props.entries
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_uppercase()
}

/// Parse a boolean token (`true/false`, `yes/no`, `on/off`, `1/0`, `y/n`).
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
