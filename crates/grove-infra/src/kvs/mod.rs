//! Resilient key-value store client.
//!
//! [`KvsClient`] owns a single connection produced by a [`KvsConnector`] and
//! keeps it alive from a background task. Backends implement the two small
//! traits below; the client adds namespacing, expiry and reconnection.

mod client;
mod config;
mod memory;

#[cfg(feature = "redis")]
mod redis;

use async_trait::async_trait;

use grove_core::ports::KvsError;

pub use client::{ConnectionState, KvsClient};
pub use config::{DEFAULT_EXPIRE_SECONDS, KvsConfig};
pub use memory::{MemoryConnection, MemoryConnector};

#[cfg(feature = "redis")]
pub use redis::RedisConnector;

/// Opens connections to a backend.
#[async_trait]
pub trait KvsConnector: Send + Sync + 'static {
    type Connection: KvsConnection;

    async fn connect(&self, config: &KvsConfig) -> Result<Self::Connection, KvsError>;
}

/// A cheap-to-clone handle on an open connection.
#[async_trait]
pub trait KvsConnection: Clone + Send + Sync + 'static {
    /// Write `value` and set its expiry as one atomic operation.
    async fn set_ex(&mut self, key: &str, value: &str, ttl_secs: u64) -> Result<(), KvsError>;

    async fn get(&mut self, key: &str) -> Result<Option<String>, KvsError>;
}
