use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::auth::{
    jwt::JwtKeys,
    repo::{PgUserStore, UserStore},
};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub keys: JwtKeys,
}

impl AppState {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        Ok(Self::from_parts(
            Arc::new(PgUserStore::new(db)),
            JwtKeys::from_secret(&config.jwt.secret),
        ))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::auth::repo::MemoryUserStore;

        Self::from_parts(
            Arc::new(MemoryUserStore::default()),
            JwtKeys::from_secret("test-secret"),
        )
    }
}
