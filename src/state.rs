use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::auth::{
    jwt::JwtKeys,
    memory::InMemoryUserStore,
    password,
    repo::{PgUserStore, UserStore},
    services::seed_admin,
};
use crate::config::AppConfig;
use crate::contact::repo::{ContactStore, InMemoryContactStore, PgContactStore};

/// Process-wide collaborators, built once at startup and read-only after.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub contacts: Arc<dyn ContactStore>,
    pub keys: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(config).await
    }

    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        tokio::task::spawn_blocking(password::warm_up)
            .await
            .context("prepare dummy password hash")?;

        let state = match config.database_url.as_deref() {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;
                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;
                info!("using postgres stores");
                Self::from_parts(
                    Arc::new(PgUserStore::new(db.clone())),
                    Arc::new(PgContactStore::new(db)),
                    Arc::new(config),
                )
            }
            None => {
                warn!("DATABASE_URL not set; data is kept in memory and lost on exit");
                Self::in_memory(config)
            }
        };

        if let Some(seed) = state.config.admin_seed.as_ref() {
            seed_admin(state.users.as_ref(), seed)
                .await
                .context("seed admin account")?;
        }
        Ok(state)
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        contacts: Arc<dyn ContactStore>,
        config: Arc<AppConfig>,
    ) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            users,
            contacts,
            keys,
            config,
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_parts(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryContactStore::new()),
            Arc::new(config),
        )
    }
}
