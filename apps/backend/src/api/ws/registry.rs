//! Registry of live push-channel connections

use axum::extract::ws::{CloseFrame, Message};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::api::ServerMessage;

/// Frames a connection may have queued before it counts as too slow and is
/// dropped from the registry.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// Sending half of one client's outbound queue. The connection's writer task
/// owns the receiving half.
pub type ConnectionSender = mpsc::Sender<Message>;
pub type ConnectionReceiver = mpsc::Receiver<Message>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to one live client
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    sender: ConnectionSender,
}

impl Connection {
    /// Create a connection along with the queue its writer drains
    pub fn open() -> (Self, ConnectionReceiver) {
        let (sender, receiver) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        let connection = Self {
            id: ConnectionId::new(),
            sender,
        };
        (connection, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Outcome of one fan-out. Informational only, failures are already logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Set of connected push clients, shared across handlers.
///
/// Cloning is cheap and every clone sees the same set. Broadcasts work on a
/// snapshot of the senders, so connections may come and go mid-broadcast.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<ConnectionId, ConnectionSender>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, connection: Connection) -> ConnectionId {
        let id = connection.id;
        let mut connections = self.connections.write().await;
        connections.insert(id, connection.sender);
        log::info!(
            "✅ Client {} connected. Total connections: {}",
            id,
            connections.len()
        );
        id
    }

    /// Remove a connection. Returns false if it was already gone.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        let removed = connections.remove(&id).is_some();
        if removed {
            log::info!(
                "❌ Client {} disconnected. Total connections: {}",
                id,
                connections.len()
            );
        } else {
            log::debug!("Client {} was not registered", id);
        }
        removed
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send `message` to every connection registered when the call starts.
    ///
    /// Never blocks on a client and never fails. A connection whose queue is
    /// closed is logged and skipped. One whose queue is full is logged and
    /// dropped from the registry, which ends its writer once the queue drains.
    pub async fn broadcast_all(&self, message: &ServerMessage) -> BroadcastReport {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize broadcast message: {}", e);
                return BroadcastReport::default();
            }
        };
        let frame = Message::Text(json.into());

        let targets: Vec<(ConnectionId, ConnectionSender)> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .map(|(id, sender)| (*id, sender.clone()))
                .collect()
        };

        let mut report = BroadcastReport::default();
        let mut too_slow = Vec::new();
        for (id, sender) in targets {
            match sender.try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    log::warn!("Client {} outbound queue full, dropping it", id);
                    report.failed += 1;
                    too_slow.push(id);
                }
                Err(TrySendError::Closed(_)) => {
                    log::warn!("Failed to deliver broadcast to client {}", id);
                    report.failed += 1;
                }
            }
        }

        if !too_slow.is_empty() {
            let mut connections = self.connections.write().await;
            for id in &too_slow {
                connections.remove(id);
            }
            log::info!(
                "Dropped {} slow client(s). Total connections: {}",
                too_slow.len(),
                connections.len()
            );
        }

        log::debug!(
            "Broadcast delivered to {} client(s), {} failed",
            report.delivered,
            report.failed
        );
        report
    }

    /// Ask every client to close and forget them all. Used on shutdown.
    pub async fn close_all(&self) {
        let drained: Vec<(ConnectionId, ConnectionSender)> =
            self.connections.write().await.drain().collect();

        let frame = CloseFrame {
            code: axum::extract::ws::close_code::AWAY,
            reason: "server shutting down".into(),
        };
        for (id, sender) in &drained {
            // A full queue still closes: the writer stops once it drains
            // and finds the sender gone
            if sender.try_send(Message::Close(Some(frame.clone()))).is_err() {
                log::debug!("Client {} gone or backed up at shutdown", id);
            }
        }
        log::info!("Closed {} push connection(s)", drained.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api::DishStatus;

    fn status_message(id: i32, is_published: bool) -> ServerMessage {
        ServerMessage::DishStatusChanged(DishStatus {
            id,
            name: "Chicken Biryani".to_string(),
            image_url: "https://example.com/biryani.jpg".to_string(),
            is_published,
        })
    }

    fn received_text(receiver: &mut ConnectionReceiver) -> Option<String> {
        match receiver.try_recv() {
            Ok(Message::Text(text)) => Some(text.as_str().to_string()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_connection() {
        let registry = ConnectionRegistry::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (connection, receiver) = Connection::open();
            registry.register(connection).await;
            receivers.push(receiver);
        }

        let report = registry.broadcast_all(&status_message(5, true)).await;

        assert_eq!(report, BroadcastReport { delivered: 3, failed: 0 });
        for receiver in receivers.iter_mut() {
            let text = received_text(receiver).expect("missing broadcast");
            let parsed: ServerMessage = serde_json::from_str(&text).unwrap();
            assert_eq!(parsed, status_message(5, true));
        }
    }

    #[tokio::test]
    async fn test_broken_connection_does_not_stop_fan_out() {
        let registry = ConnectionRegistry::new();
        let (healthy_a, mut rx_a) = Connection::open();
        let (broken, rx_broken) = Connection::open();
        let (healthy_b, mut rx_b) = Connection::open();
        registry.register(healthy_a).await;
        registry.register(broken).await;
        registry.register(healthy_b).await;

        // Writer task gone, queue closed
        drop(rx_broken);

        let report = registry.broadcast_all(&status_message(1, false)).await;

        assert_eq!(report, BroadcastReport { delivered: 2, failed: 1 });
        assert!(received_text(&mut rx_a).is_some());
        assert!(received_text(&mut rx_b).is_some());
    }

    #[tokio::test]
    async fn test_full_queue_drops_slow_connection_only() {
        let registry = ConnectionRegistry::new();
        let (fast, mut rx_fast) = Connection::open();
        let (slow, mut rx_slow) = Connection::open();
        registry.register(fast).await;
        registry.register(slow).await;

        // The slow client never drains, the fast one keeps up
        for i in 0..OUTBOUND_QUEUE_CAPACITY {
            let report = registry.broadcast_all(&status_message(1, i % 2 == 0)).await;
            assert_eq!(report, BroadcastReport { delivered: 2, failed: 0 });
            assert!(received_text(&mut rx_fast).is_some());
        }

        let report = registry.broadcast_all(&status_message(1, true)).await;

        assert_eq!(report, BroadcastReport { delivered: 1, failed: 1 });
        assert!(received_text(&mut rx_fast).is_some());
        assert_eq!(registry.connection_count().await, 1);

        // Slow client keeps what was queued, then sees its queue closed
        for _ in 0..OUTBOUND_QUEUE_CAPACITY {
            assert!(received_text(&mut rx_slow).is_some());
        }
        assert!(matches!(
            rx_slow.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));

        // Later broadcasts no longer touch it
        let report = registry.broadcast_all(&status_message(1, false)).await;
        assert_eq!(report, BroadcastReport { delivered: 1, failed: 0 });
    }

    #[tokio::test]
    async fn test_unregistered_connection_gets_nothing() {
        let registry = ConnectionRegistry::new();
        let (connection, mut receiver) = Connection::open();
        let id = registry.register(connection).await;

        assert!(registry.unregister(id).await);
        let report = registry.broadcast_all(&status_message(2, true)).await;

        assert_eq!(report, BroadcastReport::default());
        assert!(received_text(&mut receiver).is_none());
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_unregister_twice_is_noop() {
        let registry = ConnectionRegistry::new();
        let (connection, _receiver) = Connection::open();
        let id = registry.register(connection).await;

        assert!(registry.unregister(id).await);
        assert!(!registry.unregister(id).await);
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_late_registration_misses_earlier_broadcast() {
        let registry = ConnectionRegistry::new();
        let (early, mut rx_early) = Connection::open();
        registry.register(early).await;

        registry.broadcast_all(&status_message(3, true)).await;

        let (late, mut rx_late) = Connection::open();
        registry.register(late).await;

        assert!(received_text(&mut rx_early).is_some());
        assert!(received_text(&mut rx_late).is_none());
    }

    #[tokio::test]
    async fn test_clones_share_one_set() {
        let registry = ConnectionRegistry::new();
        let handle = registry.clone();
        let (connection, _receiver) = Connection::open();

        handle.register(connection).await;

        assert_eq!(registry.connection_count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_and_broadcast() {
        let registry = ConnectionRegistry::new();
        let mut tasks = Vec::new();

        for i in 0..50 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let (connection, receiver) = Connection::open();
                let id = registry.register(connection).await;
                registry.broadcast_all(&status_message(i, i % 2 == 0)).await;
                if i % 2 == 0 {
                    registry.unregister(id).await;
                }
                receiver
            }));
        }

        let mut receivers = Vec::new();
        for task in tasks {
            receivers.push(task.await.unwrap());
        }

        assert_eq!(registry.connection_count().await, 25);
        // Every connection saw at least its own broadcast
        for receiver in receivers.iter_mut() {
            assert!(received_text(receiver).is_some());
        }
    }

    #[tokio::test]
    async fn test_close_all_sends_close_and_empties() {
        let registry = ConnectionRegistry::new();
        let (connection, mut receiver) = Connection::open();
        registry.register(connection).await;

        registry.close_all().await;

        assert_eq!(registry.connection_count().await, 0);
        assert!(matches!(receiver.try_recv(), Ok(Message::Close(Some(_)))));
    }
}
