//! Redis backend.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Client, RedisError};

use grove_core::ports::KvsError;

use super::{KvsConfig, KvsConnection, KvsConnector};

/// Opens multiplexed connections to the server named by `KVS_HOST`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

/// Accept either a bare `host:port` or a full connection URL.
fn redis_url(host: &str) -> String {
    if host.contains("://") {
        host.to_string()
    } else {
        format!("redis://{host}")
    }
}

/// Transport failures invalidate the connection; everything else is a
/// command-level error on a healthy connection.
fn classify(err: RedisError) -> KvsError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout()
    {
        KvsError::Connection(err.to_string())
    } else {
        KvsError::Backend(err.to_string())
    }
}

#[async_trait]
impl KvsConnector for RedisConnector {
    type Connection = MultiplexedConnection;

    async fn connect(&self, config: &KvsConfig) -> Result<MultiplexedConnection, KvsError> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| KvsError::Configuration("KVS_HOST is not set".to_string()))?;
        let url = redis_url(host);

        let client =
            Client::open(url.as_str()).map_err(|e| KvsError::Configuration(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(classify)?;

        tracing::info!(host = %host, "Connected to Redis");
        Ok(conn)
    }
}

#[async_trait]
impl KvsConnection for MultiplexedConnection {
    async fn set_ex(&mut self, key: &str, value: &str, ttl_secs: u64) -> Result<(), KvsError> {
        let ttl = i64::try_from(ttl_secs).map_err(|e| KvsError::Configuration(e.to_string()))?;

        // MULTI / SET / EXPIRE / EXEC
        let _: () = redis::pipe()
            .atomic()
            .set(key, value)
            .ignore()
            .expire(key, ttl)
            .ignore()
            .query_async(self)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn get(&mut self, key: &str) -> Result<Option<String>, KvsError> {
        redis::cmd("GET")
            .arg(key)
            .query_async(self)
            .await
            .map_err(classify)
    }
}
