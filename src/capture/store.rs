//! Shared store of captured requests, keyed by the full request URL.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::model::RequestInfo;

/// Cloneable handle to a concurrent map of captured requests.
///
/// A later request to the same URL replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct CaptureStore {
    inner: Arc<RwLock<HashMap<String, RequestInfo>>>,
}

impl CaptureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, info: RequestInfo) {
        self.inner.write().insert(key.into(), info);
    }

    pub fn get(&self, key: &str) -> Option<RequestInfo> {
        self.inner.read().get(key).cloned()
    }

    /// Applies `f` to the entry under `key`. Returns the updated entry.
    pub fn update<F>(&self, key: &str, f: F) -> Option<RequestInfo>
    where
        F: FnOnce(&mut RequestInfo),
    {
        let mut map = self.inner.write();
        let entry = map.get_mut(key)?;
        f(entry);
        Some(entry.clone())
    }

    /// Keeps only the entries for which `keep` returns true.
    pub fn retain<F>(&self, mut keep: F)
    where
        F: FnMut(&str, &RequestInfo) -> bool,
    {
        self.inner.write().retain(|k, v| keep(k, v));
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Copies out all entries as `(key, request)` pairs, sorted by key.
    pub fn snapshot(&self) -> Vec<(String, RequestInfo)> {
        let mut entries: Vec<_> = self
            .inner
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

}
