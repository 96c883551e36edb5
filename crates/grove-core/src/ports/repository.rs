use async_trait::async_trait;

use crate::domain::{Fruit, NewFruit, NewUser, User, UserProfile};
use crate::error::RepoError;

/// Fruit storage. Deleted rows are invisible to every read.
#[async_trait]
pub trait FruitRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Fruit>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Fruit>, RepoError>;

    async fn create(&self, fruit: NewFruit) -> Result<Fruit, RepoError>;

    /// Replace name and price. `RepoError::NotFound` when no live row has `id`.
    async fn update(&self, id: i64, fruit: NewFruit) -> Result<Fruit, RepoError>;

    /// Logical delete. Succeeds even if nothing matched.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

/// User storage with domain-specific lookups.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;

    /// Only enabled, non-deleted users are returned.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Insert an unverified user. Fails with `RepoError::Constraint` when a
    /// verified user already owns the email.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    async fn verify(&self, id: i64) -> Result<(), RepoError>;

    /// Apply the fields present in `profile`. `RepoError::NotFound` when no live row has `id`.
    async fn update(&self, id: i64, profile: UserProfile) -> Result<User, RepoError>;

    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}
