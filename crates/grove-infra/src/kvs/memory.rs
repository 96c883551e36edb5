//! In-process backend - used when no key-value server is configured, and to
//! exercise the client against outages in tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use grove_core::ports::KvsError;

use super::{KvsConfig, KvsConnection, KvsConnector};

struct Entry {
    value: String,
    ttl: Duration,
    expires_at: Instant,
}

struct Backend {
    store: RwLock<HashMap<String, Entry>>,
    available: AtomicBool,
    connects: AtomicUsize,
}

impl Backend {
    fn check(&self) -> Result<(), KvsError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(KvsError::Connection("memory backend unavailable".to_string()))
        }
    }
}

/// Connector for a shared in-memory map with per-key expiry.
///
/// Clones share the same data. [`set_available`](Self::set_available)
/// simulates the server going away: new connects are refused and open
/// connections fail with a transport error until it comes back.
#[derive(Clone)]
pub struct MemoryConnector {
    backend: Arc<Backend>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self {
            backend: Arc::new(Backend {
                store: RwLock::new(HashMap::new()),
                available: AtomicBool::new(true),
                connects: AtomicUsize::new(0),
            }),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.backend.available.store(available, Ordering::SeqCst);
    }

    /// Number of successful connects so far.
    pub fn connects(&self) -> usize {
        self.backend.connects.load(Ordering::SeqCst)
    }

    /// Expiry recorded for the live entry under the full (namespaced) `key`.
    pub async fn ttl_of(&self, key: &str) -> Option<Duration> {
        let store = self.backend.store.read().await;
        store
            .get(key)
            .filter(|e| Instant::now() < e.expires_at)
            .map(|e| e.ttl)
    }

    pub async fn keys(&self) -> Vec<String> {
        let store = self.backend.store.read().await;
        let mut keys: Vec<String> = store.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvsConnector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(&self, _config: &KvsConfig) -> Result<MemoryConnection, KvsError> {
        self.backend.check()?;
        self.backend.connects.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            backend: self.backend.clone(),
        })
    }
}

#[derive(Clone)]
pub struct MemoryConnection {
    backend: Arc<Backend>,
}

#[async_trait]
impl KvsConnection for MemoryConnection {
    async fn set_ex(&mut self, key: &str, value: &str, ttl_secs: u64) -> Result<(), KvsError> {
        self.backend.check()?;
        let ttl = Duration::from_secs(ttl_secs);
        let mut store = self.backend.store.write().await;
        store.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                ttl,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&mut self, key: &str) -> Result<Option<String>, KvsError> {
        self.backend.check()?;
        let store = self.backend.store.read().await;
        let Some(entry) = store.get(key) else {
            return Ok(None);
        };

        if Instant::now() >= entry.expires_at {
            drop(store);
            // Clean up expired entry with write lock
            self.backend.store.write().await.remove(key);
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }
}
