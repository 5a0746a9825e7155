//! Registry of connected monitoring sockets.
//!
//! Tracks live browser connections and broadcasts reload payloads, pruning
//! connections whose send fails.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::UnboundedSender;

/// Payload pushed to every connected browser when the watched tree changes.
pub(crate) const REFRESH_MESSAGE: &str = "refresh";

/// Registry of live monitoring connections.
///
/// Each connection is represented by the sending half of the channel its
/// WebSocket task drains. Keys are unique for the process lifetime and never
/// reused; a present key denotes a connection believed live.
pub(crate) struct ClientRegistry {
    next_key: AtomicU64,
    clients: Mutex<HashMap<u64, UnboundedSender<String>>>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub(crate) fn new() -> Self {
        Self {
            next_key: AtomicU64::new(1),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Register a connection and return its key. Never fails.
    pub(crate) fn register(&self, sender: UnboundedSender<String>) -> u64 {
        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        self.clients.lock().unwrap().insert(key, sender);
        key
    }

    /// Remove a connection. Unknown or already-removed keys are a no-op.
    pub(crate) fn deregister(&self, key: u64) {
        self.clients.lock().unwrap().remove(&key);
    }

    /// Send `message` to every registered connection.
    ///
    /// A failed send means the receiving task is gone; the entry is removed
    /// before this call returns. One failure never aborts delivery to the
    /// remaining connections. Iteration runs over a snapshot taken under the
    /// lock, so handlers may deregister concurrently without disturbing an
    /// in-progress broadcast.
    pub(crate) fn broadcast(&self, message: &str) {
        if self.is_empty() {
            return;
        }

        let snapshot: Vec<(u64, UnboundedSender<String>)> = {
            let clients = self.clients.lock().unwrap();
            clients.iter().map(|(key, tx)| (*key, tx.clone())).collect()
        };
        tracing::debug!(clients = snapshot.len(), "Broadcasting reload");

        let mut dead = Vec::new();
        for (key, tx) in snapshot {
            if tx.send(message.to_owned()).is_err() {
                dead.push(key);
            }
        }

        if !dead.is_empty() {
            let mut clients = self.clients.lock().unwrap();
            for key in dead {
                clients.remove(&key);
                tracing::debug!(key, "Pruned dead monitoring connection");
            }
        }
    }

    /// Number of currently registered connections.
    pub(crate) fn len(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    /// Whether no connections are registered.
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
