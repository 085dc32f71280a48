//! Live connection registry
//!
//! Tracks the worker task of every live connection together with the global
//! `stopped` flag. Registration, removal and shutdown all go through one
//! mutex, so a connection can never be registered after shutdown has taken
//! its snapshot.

use std::collections::HashMap;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

#[derive(Debug)]
pub struct Registry {
    connections: Mutex<HashMap<u64, JoinHandle<()>>>,
    stopped: watch::Sender<bool>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            connections: Mutex::new(HashMap::new()),
            stopped,
        }
    }

    /// Receiver that observes the `stopped` flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.stopped.subscribe()
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.borrow()
    }

    /// Spawns a worker and records it under `id`.
    ///
    /// `spawn` runs while the registry is locked, so the worker cannot remove
    /// itself before it has been inserted. Returns `false` without calling
    /// `spawn` once the registry is stopped.
    pub async fn register<F>(&self, id: u64, spawn: F) -> bool
    where
        F: FnOnce() -> JoinHandle<()>,
    {
        let mut connections = self.connections.lock().await;
        if self.is_stopped() {
            return false;
        }
        connections.insert(id, spawn());
        true
    }

    /// Drops the entry for `id`. Called by a worker as its last step.
    pub async fn remove(&self, id: u64) -> bool {
        self.connections.lock().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }

    /// Stops the server and waits for every registered worker to exit.
    ///
    /// Setting the flag wakes every worker blocked in a read or a write.
    /// Returns how many workers were drained; later calls drain nothing.
    pub async fn shutdown(&self) -> usize {
        let drained: Vec<(u64, JoinHandle<()>)> = {
            let mut connections = self.connections.lock().await;
            self.stopped.send_replace(true);
            connections.drain().collect()
        };

        let count = drained.len();
        tracing::info!(connections = count, "Draining connections");

        for (id, task) in drained {
            if let Err(e) = task.await {
                tracing::warn!(conn = id, error = %e, "Connection worker did not exit cleanly");
            }
        }

        count
    }
}
