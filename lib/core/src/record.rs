use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single dataset row: field name to string value, in first-seen order.
///
/// Inserting an existing field replaces its value but keeps its position,
/// so "last value wins" never reorders columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `key=value` arguments.
    ///
    /// The key is trimmed; the value is kept verbatim apart from trailing
    /// newlines. A pair without `=` or with an empty key is rejected.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut record = Self::new();
        for raw in pairs {
            let raw = raw.as_ref();
            let (key, value) = raw.split_once('=').ok_or_else(|| {
                Error::InvalidInput(format!("invalid pair (expected key=value): {}", raw))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::InvalidInput(format!("empty key in pair: {}", raw)));
            }
            record
                .fields
                .insert(key.to_string(), value.trim_end_matches('\n').to_string());
        }
        Ok(record)
    }

    /// Set a field, keeping its original position if it already exists.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let field = field.into();
        if field.is_empty() {
            return Err(Error::InvalidInput("field names must be non-empty".to_string()));
        }
        self.fields.insert(field, value.into());
        Ok(())
    }

    #[inline]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[inline]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Collects without validation; empty names are caught when the record is
/// written, since a schema cannot hold them.
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
