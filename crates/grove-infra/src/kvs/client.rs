use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tokio::sync::{RwLock, watch};
use tracing::{Instrument, Span};

use grove_core::ports::{KeyValueStore, KvsError};

use super::{KvsConfig, KvsConnection, KvsConnector};

/// Lifecycle of the client's single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Terminal. Reached only through [`KvsClient::close`].
    Closed,
}

struct Slot<C> {
    conn: Option<C>,
    /// Bumped on every new connection so stale failures can't evict a fresh one.
    generation: u64,
    state: ConnectionState,
}

struct Inner<K: KvsConnector> {
    connector: K,
    config: KvsConfig,
    slot: RwLock<Slot<K::Connection>>,
    started: AtomicBool,
    closed: AtomicBool,
    shutdown: watch::Sender<bool>,
    span: Span,
}

/// Key-value client holding one connection that repairs itself.
///
/// Construction never fails: if the backend is down the client starts
/// disconnected and a background task retries every `retry_interval` until
/// [`close`](Self::close) is called. Operations never wait for a connection;
/// without one they return [`KvsError::NotConnected`] immediately.
///
/// Every key is prefixed with the configured namespace and every write
/// carries the configured expiry. Clones share the same connection.
pub struct KvsClient<K: KvsConnector> {
    inner: Arc<Inner<K>>,
}

impl<K: KvsConnector> Clone for KvsClient<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: KvsConnector> KvsClient<K> {
    /// Connect once, then keep the connection alive in the background.
    pub async fn new(config: KvsConfig, connector: K) -> Self {
        let span = tracing::info_span!("kvs", namespace = %config.namespace);
        Self::with_span(config, connector, span).await
    }

    /// Like [`new`](Self::new), logging under the caller's `span`.
    pub async fn with_span(config: KvsConfig, connector: K, span: Span) -> Self {
        let client = Self::idle(config, connector, span);
        let inner = client.inner.clone();
        async move { inner.try_connect().await }
            .instrument(client.inner.span.clone())
            .await;
        client.start();
        client
    }

    /// A disconnected client with no background task yet.
    fn idle(config: KvsConfig, connector: K, span: Span) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                connector,
                config,
                slot: RwLock::new(Slot {
                    conn: None,
                    generation: 0,
                    state: ConnectionState::Disconnected,
                }),
                started: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                shutdown,
                span,
            }),
        }
    }

    /// Spawn the reconnect task. Returns `false` if it was already running
    /// or the client is closed.
    pub fn start(&self) -> bool {
        if self.inner.closed.load(Ordering::SeqCst) || self.inner.started.swap(true, Ordering::SeqCst)
        {
            return false;
        }

        let shutdown = self.inner.shutdown.subscribe();
        let span = self.inner.span.clone();
        tokio::spawn(reconnect_loop(Arc::downgrade(&self.inner), shutdown).instrument(span));
        true
    }

    /// Stop the reconnect task and drop the connection. Idempotent.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.shutdown.send_replace(true);

        let mut slot = self.inner.slot.write().await;
        slot.conn = None;
        slot.state = ConnectionState::Closed;
        drop(slot);

        tracing::info!(parent: &self.inner.span, "kvs client closed");
    }

    pub async fn state(&self) -> ConnectionState {
        self.inner.slot.read().await.state
    }

    pub fn config(&self) -> &KvsConfig {
        &self.inner.config
    }
}

impl<K: KvsConnector> Inner<K> {
    /// One connection attempt, bounded by `connect_timeout`. The lock is
    /// released while the connector runs.
    async fn try_connect(&self) -> bool {
        {
            let mut slot = self.slot.write().await;
            if slot.state != ConnectionState::Disconnected {
                return slot.state == ConnectionState::Connected;
            }
            slot.state = ConnectionState::Connecting;
        }

        let result = tokio::time::timeout(
            self.config.connect_timeout,
            self.connector.connect(&self.config),
        )
        .await
        .unwrap_or_else(|_| Err(KvsError::Connection("connect timed out".to_string())));

        let mut slot = self.slot.write().await;
        if slot.state == ConnectionState::Closed {
            return false;
        }

        match result {
            Ok(conn) => {
                slot.conn = Some(conn);
                slot.generation += 1;
                slot.state = ConnectionState::Connected;
                tracing::info!(generation = slot.generation, "kvs connected");
                true
            }
            Err(e) => {
                slot.state = ConnectionState::Disconnected;
                tracing::warn!(
                    error = %e,
                    retry_in = ?self.config.retry_interval,
                    "kvs connect failed"
                );
                false
            }
        }
    }

    async fn needs_connection(&self) -> bool {
        self.slot.read().await.state == ConnectionState::Disconnected
    }

    /// Clone the live connection out of the slot.
    async fn checkout(&self) -> Result<(K::Connection, u64), KvsError> {
        let slot = self.slot.read().await;
        match (&slot.conn, slot.state) {
            (Some(conn), ConnectionState::Connected) => Ok((conn.clone(), slot.generation)),
            _ => Err(KvsError::NotConnected),
        }
    }

    /// Drop the connection of `generation` after a transport failure.
    async fn mark_broken(&self, generation: u64, error: &KvsError) {
        let mut slot = self.slot.write().await;
        if slot.generation != generation || slot.state != ConnectionState::Connected {
            return;
        }
        slot.conn = None;
        slot.state = ConnectionState::Disconnected;
        tracing::warn!(generation, error = %error, "kvs connection lost");
    }

    async fn observe<T>(&self, result: &Result<T, KvsError>, generation: u64) {
        if let Err(e) = result {
            if e.is_transport() {
                self.mark_broken(generation, e).await;
            }
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), KvsError> {
        let (mut conn, generation) = self.checkout().await?;
        let key = self.config.namespaced(key);

        let result = conn.set_ex(&key, &value, self.config.expire_seconds).await;
        self.observe(&result, generation).await;
        if let Err(e) = &result {
            tracing::debug!(key = %key, error = %e, "kvs set failed");
        }
        result
    }

    async fn get(&self, key: &str) -> Result<String, KvsError> {
        let (mut conn, generation) = self.checkout().await?;
        let key = self.config.namespaced(key);

        let result = conn.get(&key).await;
        self.observe(&result, generation).await;
        result?.ok_or(KvsError::NotFound { key })
    }
}

async fn reconnect_loop<K: KvsConnector>(inner: Weak<Inner<K>>, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!("kvs reconnect loop started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        let interval = {
            let Some(inner) = inner.upgrade() else {
                break;
            };
            if inner.needs_connection().await {
                inner.try_connect().await;
            }
            inner.config.retry_interval
        };

        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::debug!("kvs reconnect loop stopped");
}

#[async_trait]
impl<K: KvsConnector> KeyValueStore for KvsClient<K> {
    async fn set_raw(&self, key: &str, value: String) -> Result<(), KvsError> {
        let span = self.inner.span.clone();
        self.inner.set(key, value).instrument(span).await
    }

    async fn get_raw(&self, key: &str) -> Result<String, KvsError> {
        let span = self.inner.span.clone();
        self.inner.get(key).instrument(span).await
    }

    async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    async fn close(&self) {
        KvsClient::close(self).await;
    }
}
