// Live agent connections keyed by computer name.
// Each connection gets a unique id so that a reconnect under the same name
// replaces the old entry, and the old socket's teardown leaves the new one alone.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Notify, RwLock};
use tokio::time::{Duration, Instant};

struct AgentEntry {
    connection_id: u64,
    last_seen: Instant,
    kick: Arc<Notify>,
}

/// Handle held by the socket task that registered a name.
#[derive(Debug, Clone)]
pub struct AgentLease {
    pub name: String,
    pub connection_id: u64,
    kick: Arc<Notify>,
}

impl AgentLease {
    /// Resolves once the registry evicts this connection.
    pub async fn kicked(&self) {
        self.kick.notified().await
    }
}

#[derive(Default)]
pub struct ConnectionRegistry {
    agents: RwLock<HashMap<String, AgentEntry>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`, replacing (and kicking) any previous connection for it.
    pub async fn register(&self, name: &str) -> AgentLease {
        let connection_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let kick = Arc::new(Notify::new());
        let previous = self.agents.write().await.insert(
            name.to_string(),
            AgentEntry {
                connection_id,
                last_seen: Instant::now(),
                kick: kick.clone(),
            },
        );
        if let Some(previous) = previous {
            tracing::info!(agent = name, "Replacing existing connection");
            previous.kick.notify_one();
        }
        AgentLease {
            name: name.to_string(),
            connection_id,
            kick,
        }
    }

    /// Refreshes last activity. Returns false if the lease is no longer current.
    pub async fn touch(&self, lease: &AgentLease) -> bool {
        let mut agents = self.agents.write().await;
        match agents.get_mut(&lease.name) {
            Some(entry) if entry.connection_id == lease.connection_id => {
                entry.last_seen = Instant::now();
                true
            }
            _ => false,
        }
    }

    /// Removes the entry if it still belongs to `lease`.
    pub async fn release(&self, lease: &AgentLease) -> bool {
        let mut agents = self.agents.write().await;
        match agents.get(&lease.name) {
            Some(entry) if entry.connection_id == lease.connection_id => {
                agents.remove(&lease.name);
                true
            }
            _ => false,
        }
    }

    pub async fn is_online(&self, name: &str) -> bool {
        self.agents.read().await.contains_key(name)
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }

    /// Removes every entry idle for longer than `max_idle` and tells its socket
    /// task to close. Returns the evicted names.
    pub async fn evict_stale(&self, max_idle: Duration) -> Vec<String> {
        let now = Instant::now();
        let mut agents = self.agents.write().await;
        let stale: Vec<String> = agents
            .iter()
            .filter(|(_, e)| now.duration_since(e.last_seen) > max_idle)
            .map(|(name, _)| name.clone())
            .collect();
        for name in &stale {
            if let Some(entry) = agents.remove(name) {
                entry.kick.notify_one();
            }
        }
        stale
    }
}
