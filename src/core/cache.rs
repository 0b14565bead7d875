use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory cache shared between rate requests of a single run.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let cache = self.inner.lock().await;
        let value = cache.get(key).cloned();
        debug!(?key, hit = value.is_some(), "Cache lookup");
        value
    }

    pub async fn put(&self, key: K, value: V) {
        let mut cache = self.inner.lock().await;
        debug!(?key, "Cache put");
        cache.insert(key, value);
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = Cache::<String, f64>::new();

        assert!(cache.get(&"USDEUR=X".to_string()).await.is_none());

        cache.put("USDEUR=X".to_string(), 0.91).await;
        assert_eq!(cache.get(&"USDEUR=X".to_string()).await, Some(0.91));
        assert!(cache.get(&"EURUSD=X".to_string()).await.is_none());

        // Later writes replace the entry
        cache.put("USDEUR=X".to_string(), 0.93).await;
        assert_eq!(cache.get(&"USDEUR=X".to_string()).await, Some(0.93));
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = Cache::<String, f64>::new();
        let clone = cache.clone();
        clone.put("GBPINR=X".to_string(), 106.7).await;
        assert_eq!(cache.get(&"GBPINR=X".to_string()).await, Some(106.7));
    }
}
