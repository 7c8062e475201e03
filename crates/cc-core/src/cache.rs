use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    inserted: Instant,
}

/// Time-bounded response cache. Each owner holds its own instance; there is
/// no shared global cache.
pub struct ResponseCache<V> {
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> ResponseCache<V> {
    /// `capacity == 0` disables caching.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let fresh = entries.get(key).map(|e| e.inserted.elapsed() < self.ttl)?;
        if fresh {
            entries.get(key).map(|e| e.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: V) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let ttl = self.ttl;
        entries.retain(|_, e| e.inserted.elapsed() < ttl);
        entries.insert(
            key.into(),
            Entry {
                value,
                inserted: Instant::now(),
            },
        );
        while entries.len() > self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }
    }

    /// Cached value for `key`, or the result of `fetch` (cached on success).
    /// The lock is not held while `fetch` runs.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(hit) = self.get(key) {
            tracing::debug!(key_chars = key.len(), "response cache hit");
            return Ok(hit);
        }
        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn hit_within_ttl_miss_after() {
        let cache = ResponseCache::new(Duration::from_millis(60), 8);
        cache.insert("k", 1);
        assert_eq!(cache.get("k"), Some(1));
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_evicted_over_capacity() {
        let cache = ResponseCache::new(Duration::from_secs(60), 2);
        cache.insert("a", 1);
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("b", 2);
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("c", 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn zero_capacity_never_stores() {
        let cache = ResponseCache::new(Duration::from_secs(60), 0);
        cache.insert("a", 1);
        assert_eq!(cache.get("a"), None);
    }

    #[tokio::test]
    async fn fetch_runs_once_per_key_and_errors_are_not_cached() {
        let cache: ResponseCache<String> = ResponseCache::new(Duration::from_secs(60), 8);
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        for _ in 0..3 {
            let v = cache
                .get_or_try_insert_with("prompt", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("answer".to_string())
                })
                .await
                .unwrap();
            assert_eq!(v, "answer");
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let err = cache
            .get_or_try_insert_with("broken", || async { Err::<String, _>("down".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "down");
        assert_eq!(cache.get("broken"), None);
    }
}
