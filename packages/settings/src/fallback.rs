// ABOUTME: Last computed effective value per setting
// ABOUTME: Lets consumers read a setting without a store round trip

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Shared handle to the effective values written by the last reconciliation.
///
/// Clones share the same map. Writes are last-writer-wins per name and only
/// happen inside this crate; everything else reads.
#[derive(Debug, Clone, Default)]
pub struct FallbackCache {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl FallbackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, name: &str) -> Option<String> {
        self.values.read().await.get(name).cloned()
    }

    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.values.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    pub(crate) async fn insert(&self, name: &str, value: &str) {
        self.values
            .write()
            .await
            .insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = FallbackCache::new();
        let reader = cache.clone();
        assert!(reader.is_empty().await);

        cache.insert("foo", "abc").await;
        cache.insert("foo", "xyz").await;

        assert_eq!(reader.get("foo").await, Some("xyz".to_string()));
        assert_eq!(reader.len().await, 1);
        assert_eq!(reader.get("bar").await, None);
    }
}
