//! # Grove Infrastructure
//!
//! Concrete implementations of the ports defined in `grove-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `auth` - JWT verification
//! - `redis` - Redis backend for the key-value client

pub mod database;
pub mod kvs;

#[cfg(feature = "auth")]
pub mod auth;

pub use database::{DatabaseConfig, InMemoryFruitRepository, InMemoryUserRepository};
pub use kvs::{ConnectionState, KvsClient, KvsConfig, MemoryConnector};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenVerifier, bearer_token};

#[cfg(feature = "postgres")]
pub use database::{PostgresFruitRepository, PostgresUserRepository};

#[cfg(feature = "redis")]
pub use kvs::RedisConnector;
