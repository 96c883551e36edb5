use std::sync::Arc;

use crate::domain::{Fruit, FruitBody};
use crate::error::{DomainError, RepoError};
use crate::ports::{FruitRepository, KeyValueStore, KeyValueStoreExt, KvsError};

/// Fruit use cases with an optional read-through cache in front of the repository.
///
/// Cached entries hold `Option<Fruit>`: `None` marks an id known to be absent,
/// so repeated lookups of deleted fruits stay off the database until the
/// entry expires.
#[derive(Clone)]
pub struct FruitService {
    repo: Arc<dyn FruitRepository>,
    cache: Option<Arc<dyn KeyValueStore>>,
}

fn cache_key(id: i64) -> String {
    format!("fruit:{id}")
}

impl FruitService {
    pub fn new(repo: Arc<dyn FruitRepository>) -> Self {
        Self { repo, cache: None }
    }

    pub fn with_cache(mut self, cache: Arc<dyn KeyValueStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn get_all(&self) -> Result<Vec<Fruit>, DomainError> {
        Ok(self.repo.find_all().await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Fruit, DomainError> {
        if let Some(cached) = self.cached(id).await {
            tracing::debug!(fruit_id = id, hit = cached.is_some(), "fruit served from cache");
            return cached.ok_or_else(|| DomainError::not_found("fruit", id));
        }

        let fruit = self.repo.find_by_id(id).await?;
        self.remember(id, fruit.as_ref()).await;
        fruit.ok_or_else(|| DomainError::not_found("fruit", id))
    }

    pub async fn create(&self, body: &FruitBody) -> Result<Fruit, DomainError> {
        let new_fruit = body.validate()?;
        let fruit = self.repo.create(new_fruit).await?;
        tracing::info!(fruit_id = fruit.id, name = %fruit.name, "fruit created");
        self.remember(fruit.id, Some(&fruit)).await;
        Ok(fruit)
    }

    pub async fn update(&self, id: i64, body: &FruitBody) -> Result<Fruit, DomainError> {
        let new_fruit = body.validate()?;
        let fruit = self.repo.update(id, new_fruit).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("fruit", id),
            other => other.into(),
        })?;
        self.remember(id, Some(&fruit)).await;
        Ok(fruit)
    }

    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        self.repo.delete(id).await?;
        tracing::info!(fruit_id = id, "fruit deleted");
        self.remember(id, None).await;
        Ok(())
    }

    /// `None` when there is no usable cache entry; the caller falls back to the repository.
    async fn cached(&self, id: i64) -> Option<Option<Fruit>> {
        let cache = self.cache.as_ref()?;
        match cache.get_struct::<Option<Fruit>>(&cache_key(id)).await {
            Ok(entry) => Some(entry),
            Err(KvsError::NotFound { .. }) => None,
            Err(e) => {
                tracing::debug!(fruit_id = id, error = %e, "fruit cache read skipped");
                None
            }
        }
    }

    async fn remember(&self, id: i64, fruit: Option<&Fruit>) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        if let Err(e) = cache.set_struct(&cache_key(id), &fruit).await {
            tracing::warn!(fruit_id = id, error = %e, "failed to cache fruit");
        }
    }
}
