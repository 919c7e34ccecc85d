use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::config::PostgresConfig;

pub mod repositories;

pub async fn build_pg_pool(cfg: &PostgresConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.uri)
        .await
        .map_err(Into::into)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}
