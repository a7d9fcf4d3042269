use async_trait::async_trait;

/// Key-value cache. Implementations decide when an entry stops being fresh.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Clone + Send + Sync,
{
    /// Returns the value only while it is still fresh.
    async fn get(&self, key: &K) -> Option<V>;

    async fn put(&self, key: K, value: V);

    async fn remove(&self, key: &K);

    async fn clear(&self);
}
