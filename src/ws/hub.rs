//! Relay hub tracking live connections and fanning events out to them.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::types::ServerEvent;

/// Size of the per-connection send buffer.
const CONNECTION_BUFFER_SIZE: usize = 64;

/// Identifier for a live connection, unique for the life of the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Hub for the live relay. Every connected client is a peer; events are
/// fanned out to all of them, optionally excluding the sender.
pub struct RelayHub {
    connections: DashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
    next_id: AtomicU64,
}

impl RelayHub {
    /// Create a new, empty hub.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the connection's ID and the receiver its socket task
    /// drains.
    pub fn register(&self) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(CONNECTION_BUFFER_SIZE);
        self.connections.insert(id, tx);
        info!("Registered connection {}", id);
        (id, rx)
    }

    /// Remove a connection. Safe to call more than once.
    pub fn unregister(&self, id: ConnectionId) {
        if self.connections.remove(&id).is_some() {
            info!("Unregistered connection {}", id);
        }
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Fan an event out to every connection except `exclude`.
    ///
    /// Delivery is best-effort per peer: a slow or closed connection is
    /// skipped without affecting the others. Returns the number of
    /// peers the event was handed to.
    pub fn broadcast(&self, event: ServerEvent, exclude: Option<ConnectionId>) -> usize {
        let mut delivered = 0;
        for entry in self.connections.iter() {
            let id = *entry.key();
            if Some(id) == exclude {
                continue;
            }
            match entry.value().try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!("Send buffer full for {}, dropping event", id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!("Connection {} closed, skipping", id);
                }
            }
        }
        delivered
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new()
    }
}
