//! In-memory repositories for running without a database.
//!
//! Data is lost on process restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use grove_core::domain::{Fruit, NewFruit, NewUser, User, UserProfile};
use grove_core::error::RepoError;
use grove_core::ports::{FruitRepository, UserRepository};

/// Rows keyed by id; ids are assigned from a counter that never reuses values.
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Default)]
pub struct InMemoryFruitRepository {
    table: RwLock<Table<Fruit>>,
}

impl InMemoryFruitRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FruitRepository for InMemoryFruitRepository {
    async fn find_all(&self) -> Result<Vec<Fruit>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|f| !f.is_deleted).cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Fruit>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|f| !f.is_deleted).cloned())
    }

    async fn create(&self, fruit: NewFruit) -> Result<Fruit, RepoError> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let id = table.allocate();
        let created = Fruit {
            id,
            name: fruit.name,
            price: fruit.price,
            is_deleted: false,
            is_enabled: true,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, fruit: NewFruit) -> Result<Fruit, RepoError> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .get_mut(&id)
            .filter(|f| !f.is_deleted)
            .ok_or(RepoError::NotFound)?;
        row.name = fruit.name;
        row.price = fruit.price;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut table = self.table.write().await;
        if let Some(row) = table.rows.get_mut(&id) {
            row.is_deleted = true;
            row.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_live(user: &User) -> bool {
    !user.is_deleted && user.is_enabled
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|u| !u.is_deleted).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .rev()
            .find(|u| u.email == email && is_live(u))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|u| u.email == user.email && u.email_verified && is_live(u))
        {
            return Err(RepoError::Constraint("verified user exists".to_string()));
        }

        let now = Utc::now();
        let id = table.allocate();
        let created = User {
            id,
            email: user.email,
            email_verified: false,
            last_login_at: now,
            profile: user.profile,
            is_deleted: false,
            is_enabled: true,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn verify(&self, id: i64) -> Result<(), RepoError> {
        let mut table = self.table.write().await;
        if let Some(row) = table.rows.get_mut(&id) {
            row.email_verified = true;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update(&self, id: i64, profile: UserProfile) -> Result<User, RepoError> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .get_mut(&id)
            .filter(|u| !u.is_deleted)
            .ok_or(RepoError::NotFound)?;
        row.profile.merge(profile);
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut table = self.table.write().await;
        if let Some(row) = table.rows.get_mut(&id) {
            row.is_deleted = true;
            row.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> NewFruit {
        NewFruit {
            name: "apple".to_string(),
            price: 100,
        }
    }

    #[tokio::test]
    async fn test_deleted_fruit_disappears_from_reads() {
        let repo = InMemoryFruitRepository::new();
        let a = repo.create(apple()).await.unwrap();
        let b = repo.create(apple()).await.unwrap();

        repo.delete(a.id).await.unwrap();
        repo.delete(a.id).await.unwrap();

        assert_eq!(repo.find_by_id(a.id).await.unwrap(), None);
        assert_eq!(repo.find_all().await.unwrap(), vec![b]);
        assert!(matches!(repo.update(a.id, apple()).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let repo = InMemoryFruitRepository::new();
        let a = repo.create(apple()).await.unwrap();
        repo.delete(a.id).await.unwrap();
        let b = repo.create(apple()).await.unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(NewUser::new("d@example.com", UserProfile::default()))
            .await
            .unwrap();
        assert!(!user.email_verified);

        repo.verify(user.id).await.unwrap();
        let err = repo
            .create(NewUser::new("d@example.com", UserProfile::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));

        repo.delete(user.id).await.unwrap();
        assert_eq!(repo.find_by_email("d@example.com").await.unwrap(), None);
    }
}
