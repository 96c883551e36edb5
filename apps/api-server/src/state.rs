//! Application state - shared across all handlers.

use std::sync::Arc;

use grove_core::ports::{FruitRepository, KeyValueStore, TokenVerifier, UserRepository};
use grove_core::services::{FruitService, UserService};
use grove_infra::{
    InMemoryFruitRepository, InMemoryUserRepository, JwtTokenVerifier, KvsClient, KvsConfig,
    MemoryConnector,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub fruits: FruitService,
    pub users: UserService,
    pub verifier: Arc<dyn TokenVerifier>,
    /// `None` when caching is disabled.
    pub kvs: Option<Arc<dyn KeyValueStore>>,
}

type Repositories = (Arc<dyn FruitRepository>, Arc<dyn UserRepository>);

fn in_memory_repositories() -> Repositories {
    (
        Arc::new(InMemoryFruitRepository::new()),
        Arc::new(InMemoryUserRepository::new()),
    )
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::new(config.auth.clone())?);
        let (fruit_repo, user_repo) = init_repositories(config).await;
        let kvs = init_kvs(&config.kvs).await;

        let mut fruits = FruitService::new(fruit_repo);
        if let Some(kvs) = &kvs {
            fruits = fruits.with_cache(kvs.clone());
        }

        tracing::info!(cache = kvs.is_some(), "Application state initialized");

        Ok(Self {
            fruits,
            users: UserService::new(user_repo),
            verifier,
            kvs,
        })
    }

    /// State backed entirely by in-memory repositories, without a cache.
    pub fn in_memory(verifier: Arc<dyn TokenVerifier>) -> Self {
        let (fruit_repo, user_repo) = in_memory_repositories();
        Self {
            fruits: FruitService::new(fruit_repo),
            users: UserService::new(user_repo),
            verifier,
            kvs: None,
        }
    }

    /// Put `kvs` in front of fruit lookups.
    pub fn with_kvs(mut self, kvs: Arc<dyn KeyValueStore>) -> Self {
        self.fruits = self.fruits.with_cache(kvs.clone());
        self.kvs = Some(kvs);
        self
    }
}

#[cfg(feature = "postgres")]
async fn init_repositories(config: &AppConfig) -> Repositories {
    use grove_infra::{PostgresFruitRepository, PostgresUserRepository};
    use migration::MigratorTrait;

    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return in_memory_repositories();
    };

    let db = match grove_infra::database::connect(db_config).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Using in-memory fallback.");
            return in_memory_repositories();
        }
    };

    if config.auto_migrate {
        match migration::Migrator::up(&db, None).await {
            Ok(()) => tracing::info!("Database migrations applied"),
            Err(e) => tracing::error!(error = %e, "Failed to apply migrations"),
        }
    }

    (
        Arc::new(PostgresFruitRepository::new(db.clone())),
        Arc::new(PostgresUserRepository::new(db)),
    )
}

#[cfg(not(feature = "postgres"))]
async fn init_repositories(_config: &AppConfig) -> Repositories {
    tracing::info!("Running without postgres feature - using in-memory repositories");
    in_memory_repositories()
}

/// Build the key-value client named by `KVS_HOST`. The client connects in
/// the background, so an unreachable server does not block startup.
async fn init_kvs(config: &KvsConfig) -> Option<Arc<dyn KeyValueStore>> {
    if config.host.is_none() {
        tracing::info!("KVS_HOST not set. Caching disabled.");
        return None;
    }

    if config.is_memory() {
        let client = KvsClient::new(config.clone(), MemoryConnector::new()).await;
        return Some(Arc::new(client));
    }

    #[cfg(feature = "redis")]
    {
        let client = KvsClient::new(config.clone(), grove_infra::RedisConnector).await;
        Some(Arc::new(client))
    }

    #[cfg(not(feature = "redis"))]
    {
        tracing::warn!("KVS_HOST is set but the redis feature is disabled. Caching disabled.");
        None
    }
}
