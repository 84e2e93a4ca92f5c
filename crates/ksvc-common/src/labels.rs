//! Copy-on-write label sets
//!
//! Labels flow from a deployment model into several places of a compiled
//! descriptor (service metadata, revision template metadata). A [`LabelSet`]
//! is cheap to clone and copies its storage the first time a clone is
//! written to, so a label added to one derived set can never show up in
//! another.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ordered, copy-on-write map of Kubernetes labels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSet {
    inner: Arc<BTreeMap<String, String>>,
}

impl LabelSet {
    /// Create an empty label set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label, copying the underlying map if it is shared
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        Arc::make_mut(&mut self.inner).insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Remove a label, copying the underlying map if it is shared
    pub fn remove(&mut self, key: &str) -> Option<String> {
        if !self.inner.contains_key(key) {
            return None;
        }
        Arc::make_mut(&mut self.inner).remove(key)
    }

    /// Look up a label value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    /// Whether the label is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the set has no labels
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over labels in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether two sets currently share storage
    pub fn shares_storage_with(&self, other: &LabelSet) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<BTreeMap<String, String>> for LabelSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self {
            inner: Arc::new(map),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<BTreeMap<_, _>>()
            .into()
    }
}

impl Serialize for LabelSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LabelSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, String>::deserialize(deserializer).map(Self::from)
    }
}
