//! Connection dispatcher
//!
//! Turns accepted streams into connection worker tasks. Concurrency is
//! bounded by a semaphore; a stream that cannot get a permit is closed
//! without a single byte being written.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionContext};
use crate::listing::{DirectoryLister, FsLister};
use crate::server::registry::Registry;

/// Why a stream was not given a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// Worker pool is full.
    Rejected,
    /// Server is shutting down.
    Stopped,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "worker pool exhausted"),
            Self::Stopped => write!(f, "server stopped"),
        }
    }
}

impl std::error::Error for DispatchError {}

pub struct Dispatcher {
    registry: Arc<Registry>,
    pool: Arc<Semaphore>,
    context: Arc<ConnectionContext>,
    next_id: AtomicU64,
}

impl Dispatcher {
    pub fn new(cfg: &Config, lister: Arc<dyn DirectoryLister>) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            pool: Arc::new(Semaphore::new(cfg.max_connections)),
            context: Arc::new(ConnectionContext::from_config(cfg, lister)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Dispatcher listing directories below `cfg.root`.
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg, Arc::new(FsLister::new(cfg.root.clone())))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn is_stopped(&self) -> bool {
        self.registry.is_stopped()
    }

    pub async fn live_connections(&self) -> usize {
        self.registry.len().await
    }

    /// Idle worker slots left in the pool.
    pub fn available_workers(&self) -> usize {
        self.pool.available_permits()
    }

    /// Schedules a worker for `stream` and returns its connection id.
    pub async fn dispatch<S>(&self, stream: S) -> Result<u64, DispatchError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        if self.is_stopped() {
            close(stream).await;
            return Err(DispatchError::Stopped);
        }

        let permit = match Arc::clone(&self.pool).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::warn!("Can't create more workers, connection closed");
                close(stream).await;
                return Err(DispatchError::Rejected);
            }
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.registry);
        let mut conn = Connection::new(
            id,
            stream,
            Arc::clone(&self.context),
            self.registry.subscribe(),
        );

        let registered = self
            .registry
            .register(id, move || {
                tokio::spawn(async move {
                    let worker = tokio::spawn(async move {
                        tracing::info!(conn = id, "Connection opened");
                        conn.run().await
                    });
                    // The entry goes away even if the worker panicked.
                    match worker.await {
                        Ok(reason) => {
                            tracing::info!(conn = id, reason = %reason, "Connection closed")
                        }
                        Err(e) => tracing::error!(conn = id, error = %e, "Connection worker failed"),
                    }
                    drop(permit);
                    registry.remove(id).await;
                })
            })
            .await;

        if registered {
            Ok(id)
        } else {
            // Stopped between the check above and taking the lock; dropping
            // the unspawned worker closes the stream.
            Err(DispatchError::Stopped)
        }
    }

    /// Stops accepting work and waits for every live connection to finish.
    pub async fn shutdown(&self) {
        let drained = self.registry.shutdown().await;
        tracing::info!(drained, "Shutdown complete");
    }
}

async fn close<S>(mut stream: S)
where
    S: AsyncWrite + Unpin,
{
    if let Err(e) = stream.shutdown().await {
        tracing::debug!(error = %e, "Failed to shut down rejected stream");
    }
}
