use super::Scalar;
use std::collections::{HashMap, HashSet};

/// An insertion-ordered mapping from composite key to scalar value.
///
/// Inserting an existing key replaces its value in place, keeping the key's
/// original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    fields: Vec<(String, Scalar)>,
    index: HashMap<String, usize>,
}

impl FlatRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Scalar) {
        let key = key.into();
        if let Some(&pos) = self.index.get(&key) {
            self.fields[pos].1 = value;
        } else {
            let _ = self.index.insert(key.clone(), self.fields.len());
            self.fields.push((key, value));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.index.get(key).map(|&pos| &self.fields[pos].1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for FlatRecord {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

/// Rows of flat records rendered against the union of their keys.
#[derive(Debug, Clone, Default)]
pub struct FlatTable {
    columns: Vec<String>,
    rows: Vec<FlatRecord>,
}

impl FlatTable {
    /// Build a table whose columns are every key seen, in first-seen order.
    #[must_use]
    pub fn from_records(rows: Vec<FlatRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for key in rows.iter().flat_map(FlatRecord::keys) {
            if seen.insert(key) {
                columns.push(key.to_string());
            }
        }

        Self { columns, rows }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[FlatRecord] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
