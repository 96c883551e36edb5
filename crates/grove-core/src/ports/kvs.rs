//! Key-value store port.
//!
//! Backends only move strings. Typed access goes through [`KeyValueStoreExt`],
//! which serializes values as JSON before they reach the store.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KvsError {
    #[error("kvs is not connected")]
    NotConnected,

    #[error("failed to serialize value: {0}")]
    Serialization(String),

    #[error("failed to deserialize value: {0}")]
    Deserialization(String),

    #[error("key not found: {key}")]
    NotFound { key: String },

    /// Transport-level failure. The connection that produced it is no longer trusted.
    #[error("kvs connection failed: {0}")]
    Connection(String),

    #[error("kvs command failed: {0}")]
    Backend(String),

    #[error("kvs configuration error: {0}")]
    Configuration(String),
}

impl KvsError {
    /// Whether the failure means the connection has to be re-established.
    pub fn is_transport(&self) -> bool {
        matches!(self, KvsError::Connection(_))
    }
}

/// A remote store for string values with a fixed expiry per write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, overwriting any previous value.
    async fn set_raw(&self, key: &str, value: String) -> Result<(), KvsError>;

    /// Fetch the value under `key`; a missing key is `KvsError::NotFound`.
    async fn get_raw(&self, key: &str) -> Result<String, KvsError>;

    async fn is_connected(&self) -> bool;

    /// Release the connection for good. Calling it again does nothing.
    async fn close(&self) {}
}

/// Typed helpers over any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Serialize `value` as JSON and store it.
    fn set_struct<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> impl Future<Output = Result<(), KvsError>> + Send {
        let encoded =
            serde_json::to_string(value).map_err(|e| KvsError::Serialization(e.to_string()));
        async move { self.set_raw(key, encoded?).await }
    }

    /// Fetch and decode the JSON stored under `key`.
    fn get_struct<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<T, KvsError>> + Send {
        async move {
            let raw = self.get_raw(key).await?;
            serde_json::from_str(&raw).map_err(|e| KvsError::Deserialization(e.to_string()))
        }
    }

    /// Like [`get_struct`](Self::get_struct) but decodes into `dest`, which is
    /// left untouched on any error.
    fn get_struct_into<T: DeserializeOwned + Send>(
        &self,
        key: &str,
        dest: &mut T,
    ) -> impl Future<Output = Result<(), KvsError>> + Send {
        async move {
            *dest = self.get_struct(key).await?;
            Ok(())
        }
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
