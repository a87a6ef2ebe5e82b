//! Short-TTL cache for computed leaderboards.
//!
//! Process-local, guarded by `tokio::sync::RwLock`. The TTL is only a
//! safety net: every successful write must call `invalidate` synchronously,
//! so a cache entry is never older than the last committed write to its
//! class. Expired entries are treated as misses and dropped on read.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use storage::dto::leaderboard::{LeaderboardResponse, PublicLeaderboardResponse};
use tokio::sync::RwLock;
use uuid::Uuid;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

struct TtlMap<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    async fn get(&self, key: &K) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Entry was stale; drop it so the map stays bounded by the set of
        // live classes. Re-check under the write lock in case a concurrent
        // refresh just replaced it.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key)
            && entry.expires_at <= Instant::now()
        {
            entries.remove(key);
        }
        None
    }

    async fn insert(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    async fn remove(&self, key: &K) {
        self.entries.write().await.remove(key);
    }
}

/// Two keyspaces: the staff view keyed by class id and the richer public
/// view keyed by slug. A write to a class drops both.
pub struct LeaderboardCache {
    ttl: Duration,
    internal: TtlMap<Uuid, LeaderboardResponse>,
    public: TtlMap<String, PublicLeaderboardResponse>,
}

impl LeaderboardCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            internal: TtlMap::new(),
            public: TtlMap::new(),
        }
    }

    pub async fn get_internal(&self, class_id: Uuid) -> Option<LeaderboardResponse> {
        self.internal.get(&class_id).await
    }

    pub async fn put_internal(&self, class_id: Uuid, response: LeaderboardResponse) {
        self.internal.insert(class_id, response, self.ttl).await;
    }

    pub async fn get_public(&self, slug: &str) -> Option<PublicLeaderboardResponse> {
        self.public.get(&slug.to_string()).await
    }

    pub async fn put_public(&self, slug: &str, response: PublicLeaderboardResponse) {
        self.public.insert(slug.to_string(), response, self.ttl).await;
    }

    pub async fn invalidate(&self, class_id: Uuid, public_slug: Option<&str>) {
        self.internal.remove(&class_id).await;
        if let Some(slug) = public_slug {
            self.public.remove(&slug.to_string()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn response(class_id: Uuid) -> LeaderboardResponse {
        LeaderboardResponse {
            class_id,
            generated_at: Utc::now(),
            entries: vec![],
        }
    }

    fn public_response(slug: &str) -> PublicLeaderboardResponse {
        PublicLeaderboardResponse {
            class: storage::dto::leaderboard::PublicClassInfo {
                name: "Algebra".to_string(),
                public_slug: slug.to_string(),
            },
            generated_at: Utc::now(),
            entries: vec![],
        }
    }

    #[tokio::test]
    async fn test_hit_returns_stored_value() {
        let cache = LeaderboardCache::new(Duration::from_secs(30));
        let class_id = Uuid::new_v4();

        cache.put_internal(class_id, response(class_id)).await;

        let hit = cache.get_internal(class_id).await.unwrap();
        assert_eq!(hit.class_id, class_id);
    }

    #[tokio::test]
    async fn test_miss_on_unknown_class() {
        let cache = LeaderboardCache::new(Duration::from_secs(30));
        assert!(cache.get_internal(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = LeaderboardCache::new(Duration::from_millis(10));
        let class_id = Uuid::new_v4();

        cache.put_internal(class_id, response(class_id)).await;
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(cache.get_internal(class_id).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_removes_both_keys() {
        let cache = LeaderboardCache::new(Duration::from_secs(30));
        let class_id = Uuid::new_v4();

        cache.put_internal(class_id, response(class_id)).await;
        cache.put_public("algebra-1", public_response("algebra-1")).await;

        cache.invalidate(class_id, Some("algebra-1")).await;

        assert!(cache.get_internal(class_id).await.is_none());
        assert!(cache.get_public("algebra-1").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_without_slug_keeps_other_public_entries() {
        let cache = LeaderboardCache::new(Duration::from_secs(30));
        let class_id = Uuid::new_v4();

        cache.put_public("other-class", public_response("other-class")).await;
        cache.invalidate(class_id, None).await;

        assert!(cache.get_public("other-class").await.is_some());
    }
}
