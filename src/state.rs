use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::{AppConfig, DbConfig, JwtConfig, StoreBackend};
use crate::store::{InMemoryProgramStore, PgProgramStore, ProgramStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProgramStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::with_config(config).await
    }

    /// Connect the configured store backend. Postgres is migrated on startup.
    pub async fn with_config(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ProgramStore> = match config.store {
            StoreBackend::Postgres => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(config.db.max_connections)
                    .acquire_timeout(config.db.acquire_timeout())
                    .connect(config.db.url()?)
                    .await
                    .context("connecting to postgres")?;
                let store = PgProgramStore::new(db);
                store.migrate().await.context("running migrations")?;
                info!(max_connections = config.db.max_connections, "postgres store ready");
                Arc::new(store)
            }
            StoreBackend::Memory => {
                info!("in-memory store ready; data is lost on exit");
                Arc::new(InMemoryProgramStore::new())
            }
        };

        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn ProgramStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// In-memory state with a fixed JWT secret, for tests.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store: StoreBackend::Memory,
            db: DbConfig {
                database_url: None,
                max_connections: 1,
                acquire_timeout_secs: 1,
            },
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(Arc::new(InMemoryProgramStore::new()), config)
    }
}
