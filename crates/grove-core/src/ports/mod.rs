//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod kvs;
mod repository;

pub use auth::{AuthError, AuthenticatedUser, TokenVerifier};
pub use kvs::{KeyValueStore, KeyValueStoreExt, KvsError};
pub use repository::{FruitRepository, UserRepository};
