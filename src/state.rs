use crate::auth::jwt::JwtKeys;
use crate::config::{AppConfig, StoreKind};
use crate::users::{MemoryUserStore, PgUserStore, UserStore};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub keys: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Build state from config. Also returns the pool when Postgres backs
    /// the store, so the caller can run migrations on it.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, Option<PgPool>)> {
        let config = Arc::new(config);
        match config.store {
            StoreKind::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres store")?;
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(config.db_max_connections)
                    .connect(url)
                    .await
                    .context("connect to database")?;
                let store = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
                Ok((Self::from_parts(store, config), Some(db)))
            }
            StoreKind::Memory => {
                tracing::warn!("using in-memory user store; accounts vanish on restart");
                let store = Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>;
                Ok((Self::from_parts(store, config), None))
            }
        }
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            store,
            keys,
            config,
        }
    }

    /// In-memory state with fixed test settings.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store: StoreKind::Memory,
            database_url: None,
            db_max_connections: 1,
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60,
            },
            cookie_secure: true,
            cors_origins: Vec::new(),
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(Arc::new(MemoryUserStore::new()), config)
    }
}
