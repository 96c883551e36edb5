//! Hand-written port doubles shared by the service tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::{Fruit, NewFruit, NewUser, User, UserProfile};
use crate::error::RepoError;
use crate::ports::{FruitRepository, KeyValueStore, KvsError, UserRepository};

#[derive(Default)]
pub struct StubFruitRepository {
    rows: Mutex<Vec<Fruit>>,
    lookups: AtomicUsize,
}

impl StubFruitRepository {
    /// Number of `find_by_id` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FruitRepository for StubFruitRepository {
    async fn find_all(&self) -> Result<Vec<Fruit>, RepoError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().filter(|f| !f.is_deleted).cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Fruit>, RepoError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|f| f.id == id && !f.is_deleted).cloned())
    }

    async fn create(&self, fruit: NewFruit) -> Result<Fruit, RepoError> {
        let mut rows = self.rows.lock().await;
        let now = Utc::now();
        let created = Fruit {
            id: rows.len() as i64 + 1,
            name: fruit.name,
            price: fruit.price,
            is_deleted: false,
            is_enabled: true,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i64, fruit: NewFruit) -> Result<Fruit, RepoError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|f| f.id == id && !f.is_deleted)
            .ok_or(RepoError::NotFound)?;
        row.name = fruit.name;
        row.price = fruit.price;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows.iter_mut().find(|f| f.id == id) {
            row.is_deleted = true;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct StubUserRepository {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for StubUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|u| u.id == id && !u.is_deleted).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|u| u.email == email && !u.is_deleted && u.is_enabled)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut rows = self.rows.lock().await;
        if rows
            .iter()
            .any(|u| u.email == user.email && u.email_verified && !u.is_deleted)
        {
            return Err(RepoError::Constraint("verified user exists".to_string()));
        }
        let now = Utc::now();
        let created = User {
            id: rows.len() as i64 + 1,
            email: user.email,
            email_verified: false,
            last_login_at: now,
            profile: user.profile,
            is_deleted: false,
            is_enabled: true,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn verify(&self, id: i64) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows.iter_mut().find(|u| u.id == id) {
            row.email_verified = true;
        }
        Ok(())
    }

    async fn update(&self, id: i64, profile: UserProfile) -> Result<User, RepoError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|u| u.id == id && !u.is_deleted)
            .ok_or(RepoError::NotFound)?;
        row.profile.merge(profile);
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().await;
        if let Some(row) = rows.iter_mut().find(|u| u.id == id) {
            row.is_deleted = true;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    offline: bool,
}

impl MemoryStore {
    pub fn disconnected() -> Self {
        Self {
            entries: Mutex::default(),
            offline: true,
        }
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_raw(&self, key: &str, value: String) -> Result<(), KvsError> {
        if self.offline {
            return Err(KvsError::NotConnected);
        }
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<String, KvsError> {
        if self.offline {
            return Err(KvsError::NotConnected);
        }
        self.entries
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| KvsError::NotFound {
                key: key.to_string(),
            })
    }

    async fn is_connected(&self) -> bool {
        !self.offline
    }
}
