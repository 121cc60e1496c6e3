//! Store schema: the ordered column set of a dataset file.
//!
//! Columns are only ever appended. Once a name is part of a schema it keeps
//! its position for the lifetime of the store.

use crate::{Error, Record, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema of a freshly created store: the record's keys, first-seen order.
    pub fn from_record(record: &Record) -> Self {
        Self {
            fields: record.keys().map(str::to_string).collect(),
        }
    }

    /// Schema from a persisted header row. Empty or duplicate names would
    /// make cells unaddressable, so they are reported as corruption of `path`.
    pub fn from_header<I, S>(path: &Path, header: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields: Vec<String> = Vec::new();
        for name in header {
            let name = name.into();
            if name.is_empty() {
                return Err(Error::corrupt(
                    path,
                    format!("empty column name at header position {}", fields.len() + 1),
                ));
            }
            if fields.contains(&name) {
                return Err(Error::corrupt(path, format!("duplicate column '{}' in header", name)));
            }
            fields.push(name);
        }
        Ok(Self { fields })
    }

    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[inline]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    #[inline]
    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Fields of `record` the schema does not know yet, in record order.
    pub fn missing_from(&self, record: &Record) -> Vec<String> {
        record
            .keys()
            .filter(|k| !self.contains(k))
            .map(str::to_string)
            .collect()
    }

    /// A new schema with `new_fields` appended after the existing columns.
    pub fn expanded_with(&self, new_fields: &[String]) -> Self {
        let mut fields = self.fields.clone();
        for field in new_fields {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
        Self { fields }
    }

    /// Cells for `record` in schema order. Unknown fields are dropped and
    /// absent ones become empty strings.
    pub fn project<'a>(&'a self, record: &'a Record) -> impl Iterator<Item = &'a str> + 'a {
        self.fields.iter().map(move |f| record.get(f).unwrap_or(""))
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
