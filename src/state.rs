use crate::config::{AppConfig, SessionConfig};
use crate::store::{MealStore, MemoryStore, PgStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub meals: Arc<dyn MealStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = PgStore::connect(&config).await?;

        // Run migrations if present
        if let Err(e) = store.migrate().await {
            tracing::warn!(error = %e, "migrations failed; continuing");
        }

        let store = Arc::new(store);
        Ok(Self::from_parts(config, store.clone(), store))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        meals: Arc<dyn MealStore>,
    ) -> Self {
        Self {
            config,
            users,
            meals,
        }
    }

    /// State backed by a fresh [`MemoryStore`]; no database involved.
    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: "memory://".into(),
            database_max_connections: 1,
            session: SessionConfig::default(),
        });
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(config, store.clone(), store)
    }
}
