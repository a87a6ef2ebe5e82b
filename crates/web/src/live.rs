//! Live update fan-out for public leaderboard viewers.
//!
//! Notify-then-refetch: events carry the class id and nothing else, so the
//! channel has no staleness or ordering concerns of its own. A subscriber
//! that misses a ping (lag, drop) is still bounded by the cache TTL.
//!
//! The registry is process-local state owned by this component: created
//! empty at startup, a class's sender appears on first subscribe, senders
//! with no remaining receivers are pruned on publish, and `close_all` tears
//! everything down on shutdown.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct LeaderboardChanged {
    pub class_id: Uuid,
}

pub struct UpdateChannel {
    senders: RwLock<HashMap<Uuid, broadcast::Sender<LeaderboardChanged>>>,
}

impl UpdateChannel {
    pub fn new() -> Self {
        Self {
            senders: RwLock::new(HashMap::new()),
        }
    }

    pub async fn subscribe(&self, class_id: Uuid) -> broadcast::Receiver<LeaderboardChanged> {
        let mut senders = self.senders.write().await;
        senders
            .entry(class_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Fire-and-forget ping to every open subscriber of the class. A class
    /// whose subscribers have all disconnected is pruned here.
    pub async fn publish(&self, class_id: Uuid) {
        let mut senders = self.senders.write().await;
        if let Some(sender) = senders.get(&class_id) {
            if sender.receiver_count() == 0 {
                senders.remove(&class_id);
            } else {
                let _ = sender.send(LeaderboardChanged { class_id });
            }
        }
    }

    /// Drop every sender, ending all open subscriber streams.
    pub async fn close_all(&self) {
        self.senders.write().await.clear();
    }
}

impl Default for UpdateChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_publish() {
        let channel = UpdateChannel::new();
        let class_id = Uuid::new_v4();

        let mut rx = channel.subscribe(class_id).await;
        channel.publish(class_id).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.class_id, class_id);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let channel = UpdateChannel::new();
        channel.publish(Uuid::new_v4()).await;
    }

    #[tokio::test]
    async fn test_subscribers_are_scoped_to_one_class() {
        let channel = UpdateChannel::new();
        let watched = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mut rx = channel.subscribe(watched).await;
        channel.publish(other).await;
        channel.publish(watched).await;

        let event = rx.recv().await.unwrap();
        assert_eq!(event.class_id, watched);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnected_class_is_pruned_on_publish() {
        let channel = UpdateChannel::new();
        let class_id = Uuid::new_v4();

        let rx = channel.subscribe(class_id).await;
        drop(rx);
        channel.publish(class_id).await;

        assert!(channel.senders.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_close_all_ends_streams() {
        let channel = UpdateChannel::new();
        let mut rx = channel.subscribe(Uuid::new_v4()).await;

        channel.close_all().await;

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }
}
