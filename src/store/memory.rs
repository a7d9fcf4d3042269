use crate::core::cache::Cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
}

impl<V> CacheEntry<V> {
    /// An entry without a freshness window never goes stale.
    fn is_fresh(&self, ttl: Option<Duration>, now: Instant) -> bool {
        ttl.is_none_or(|ttl| now.duration_since(self.fetched_at) < ttl)
    }
}

/// In-memory cache with a single freshness window for all entries.
pub struct MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    inner: Arc<Mutex<HashMap<K, CacheEntry<V>>>>,
    ttl: Option<Duration>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Creates a cache whose entries expire `ttl` after they were stored.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        let fresh = cache
            .get(key)
            .map(|entry| entry.is_fresh(self.ttl, Instant::now()));
        match fresh {
            Some(true) => {
                debug!("Cache HIT for key: {:?}", key);
                cache.get(key).map(|entry| entry.value.clone())
            }
            Some(false) => {
                debug!("Cache entry expired for key: {:?}", key);
                cache.remove(key);
                None
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            fetched_at: Instant::now(),
        };
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, entry);
    }

    async fn remove(&self, key: &K) {
        let mut cache = self.inner.lock().await;
        cache.remove(key);
        debug!("Cache REMOVE for key: {:?}", key);
    }

    async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = MemoryCache::<String, i32>::new(None);

        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache.put("key1".to_string(), 123).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_ttl_expiration() {
        let cache = MemoryCache::<String, i32>::new(Some(Duration::from_millis(10)));

        cache.put("key1".to_string(), 123).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());

        // A fresh put restarts the window
        cache.put("key1".to_string(), 456).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(456));
    }

    #[test]
    fn test_entry_freshness_check() {
        let now = Instant::now();
        let entry = CacheEntry {
            value: 1,
            fetched_at: now,
        };
        let ttl = Some(Duration::from_secs(600));
        assert!(entry.is_fresh(ttl, now + Duration::from_secs(599)));
        assert!(!entry.is_fresh(ttl, now + Duration::from_secs(600)));
        assert!(entry.is_fresh(None, now + Duration::from_secs(86_400)));
    }

    #[tokio::test]
    async fn test_cache_remove_and_clear() {
        let cache = MemoryCache::<String, i32>::default();

        cache.put("key1".to_string(), 123).await;
        cache.put("key2".to_string(), 456).await;
        cache.remove(&"key1".to_string()).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
        assert_eq!(cache.get(&"key2".to_string()).await, Some(456));

        cache.clear().await;
        assert!(cache.get(&"key2".to_string()).await.is_none());
    }
}
