use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

const DEFAULT_TTL: Duration = Duration::from_secs(3 * 60 * 60);

/// Cache for the list of tag names shown in the gallery menu
#[async_trait]
pub trait TagCache: Send + Sync {
    /// Cached names, or `None` when empty or expired
    async fn get(&self) -> Option<Vec<String>>;

    async fn set(&self, tags: Vec<String>);

    async fn clear(&self);

    async fn is_expired(&self) -> bool;
}

struct Entry {
    tags: Vec<String>,
    stored_at: Instant,
}

/// Single-entry TTL cache held in memory
pub struct InMemoryTagCache {
    ttl: Duration,
    entry: RwLock<Option<Entry>>,
}

impl InMemoryTagCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }
}

impl Default for InMemoryTagCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl TagCache for InMemoryTagCache {
    async fn get(&self) -> Option<Vec<String>> {
        let entry = self.entry.read().await;
        match entry.as_ref() {
            Some(entry) if self.is_fresh(entry) => Some(entry.tags.clone()),
            _ => None,
        }
    }

    async fn set(&self, tags: Vec<String>) {
        *self.entry.write().await = Some(Entry {
            tags,
            stored_at: Instant::now(),
        });
    }

    async fn clear(&self) {
        *self.entry.write().await = None;
    }

    async fn is_expired(&self) -> bool {
        match self.entry.read().await.as_ref() {
            Some(entry) => !self.is_fresh(entry),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Vec<String> {
        vec!["design".to_string(), "ilustracao".to_string()]
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = InMemoryTagCache::default();
        assert!(cache.is_expired().await);
        assert_eq!(cache.get().await, None);

        cache.set(tags()).await;
        assert!(!cache.is_expired().await);
        assert_eq!(cache.get().await, Some(tags()));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = InMemoryTagCache::default();
        cache.set(tags()).await;
        cache.clear().await;
        assert_eq!(cache.get().await, None);
        assert!(cache.is_expired().await);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = InMemoryTagCache::new(Duration::ZERO);
        cache.set(tags()).await;
        assert!(cache.is_expired().await);
        assert_eq!(cache.get().await, None);
    }
}
