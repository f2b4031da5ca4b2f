use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::hash::Hash;

/// Current validation failures keyed by field, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Hash + Eq> {
    entries: IndexMap<F, String>,
}

impl<F: Hash + Eq> Default for FieldErrors<F> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<F: Hash + Eq> FieldErrors<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first error reported for a field.
    pub fn insert(&mut self, field: F, error: impl Into<String>) {
        self.entries.entry(field).or_insert_with(|| error.into());
    }

    pub fn get(&self, field: &F) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &F) -> bool {
        self.entries.contains_key(field)
    }

    pub fn remove(&mut self, field: &F) -> Option<String> {
        self.entries.shift_remove(field)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&F, &str)> {
        self.entries.iter().map(|(field, error)| (field, error.as_str()))
    }

    pub fn fields(&self) -> impl Iterator<Item = &F> {
        self.entries.keys()
    }

    /// First field of `order` that has an error, falling back to the first
    /// recorded error for fields outside `order`.
    pub fn first_in<'a>(&'a self, order: impl IntoIterator<Item = &'a F>) -> Option<&'a F> {
        order
            .into_iter()
            .find(|field| self.entries.contains_key(*field))
            .or_else(|| self.entries.keys().next())
    }
}

impl<F: Hash + Eq> FromIterator<(F, String)> for FieldErrors<F> {
    fn from_iter<I: IntoIterator<Item = (F, String)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (field, error) in iter {
            errors.insert(field, error);
        }
        errors
    }
}

impl<F: Hash + Eq> Extend<(F, String)> for FieldErrors<F> {
    fn extend<I: IntoIterator<Item = (F, String)>>(&mut self, iter: I) {
        for (field, error) in iter {
            self.insert(field, error);
        }
    }
}

/// Serialized as a map from dotted field path to message.
impl<F: Hash + Eq + fmt::Display> Serialize for FieldErrors<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, error) in &self.entries {
            map.serialize_entry(&field.to_string(), error)?;
        }
        map.end()
    }
}
