//! Schema-less extraction records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key every record carries with its source page.
pub const PRODUCT_URL_KEY: &str = "Product URL";

/// One extracted result for a single source URL.
///
/// Field names are whatever the model returned, kept in first-seen order.
/// A `None` value means the model reported the field without a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Option<String>>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(field, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }

    /// Set a field. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.fields.insert(key.into(), value);
    }

    /// Value of a field; `None` when absent or valueless.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_deref())
    }

    /// True when the field name is present, even without a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// `(field, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Stamp the originating URL, overwriting any model-provided value.
    pub fn set_source_url(&mut self, url: &str) {
        self.insert(PRODUCT_URL_KEY, Some(url.to_string()));
    }

    /// Cell text for a column: the value, or `""` when missing.
    pub fn cell(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }
}
