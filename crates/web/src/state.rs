use std::sync::Arc;

use storage::Database;
use uuid::Uuid;

use crate::cache::LeaderboardCache;
use crate::live::UpdateChannel;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub cache: Arc<LeaderboardCache>,
    pub updates: Arc<UpdateChannel>,
}

impl AppState {
    pub fn new(db: Database, cache: LeaderboardCache) -> Self {
        Self {
            db,
            cache: Arc::new(cache),
            updates: Arc::new(UpdateChannel::new()),
        }
    }

    /// Post-commit side effects of any write that can move a leaderboard:
    /// drop the class's cache keys and ping live subscribers. The caller
    /// passes the slug it already resolved on the way into the write, so
    /// this issues no queries and cannot fail after the commit.
    pub async fn leaderboard_changed(&self, class_id: Uuid, public_slug: Option<&str>) {
        self.cache.invalidate(class_id, public_slug).await;
        self.updates.publish(class_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;
    use storage::dto::leaderboard::{
        LeaderboardResponse, PublicClassInfo, PublicLeaderboardResponse,
    };

    fn state() -> AppState {
        // A lazy pool never connects unless queried; the invalidation path
        // must stay off the database entirely.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://unused@localhost/unused")
            .unwrap();
        AppState::new(
            Database::from_pool(pool),
            LeaderboardCache::new(Duration::from_secs(30)),
        )
    }

    #[tokio::test]
    async fn test_leaderboard_changed_drops_both_keys_without_querying() {
        let state = state();
        let class_id = Uuid::new_v4();

        state
            .cache
            .put_internal(
                class_id,
                LeaderboardResponse {
                    class_id,
                    generated_at: Utc::now(),
                    entries: vec![],
                },
            )
            .await;
        state
            .cache
            .put_public(
                "algebra-1",
                PublicLeaderboardResponse {
                    class: PublicClassInfo {
                        name: "Algebra".to_string(),
                        public_slug: "algebra-1".to_string(),
                    },
                    generated_at: Utc::now(),
                    entries: vec![],
                },
            )
            .await;

        state.leaderboard_changed(class_id, Some("algebra-1")).await;

        assert!(state.cache.get_internal(class_id).await.is_none());
        assert!(state.cache.get_public("algebra-1").await.is_none());
    }

    #[tokio::test]
    async fn test_leaderboard_changed_notifies_subscribers() {
        let state = state();
        let class_id = Uuid::new_v4();
        let mut rx = state.updates.subscribe(class_id).await;

        state.leaderboard_changed(class_id, None).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.class_id, class_id);
    }
}
