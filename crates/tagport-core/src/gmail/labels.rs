//! Label name cache.
//!
//! Maps label names to their Gmail records so mutation can resolve names
//! to identifiers without re-listing. Owned by the client instance and
//! serialized behind a mutex; keys are lowercased, which keeps names
//! case-insensitively unique.

use crate::gmail::types::Label;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Case-insensitive name-to-label cache.
#[derive(Debug, Default)]
pub struct LabelCache {
    inner: Mutex<HashMap<String, Label>>,
}

impl LabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole cache with a fresh listing.
    pub async fn replace_all(&self, labels: Vec<Label>) {
        let mut inner = self.inner.lock().await;
        inner.clear();
        for label in labels {
            inner.insert(label.name.to_lowercase(), label);
        }
    }

    /// Insert one label, displacing any entry with the same name in a
    /// different case.
    pub async fn insert(&self, label: Label) {
        self.inner.lock().await.insert(label.name.to_lowercase(), label);
    }

    /// Look up a label by name, case-insensitively.
    pub async fn get(&self, name: &str) -> Option<Label> {
        self.inner.lock().await.get(&name.to_lowercase()).cloned()
    }

    /// Look up a label identifier by name, case-insensitively.
    pub async fn id_of(&self, name: &str) -> Option<String> {
        self.get(name).await.map(|label| label.id)
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
