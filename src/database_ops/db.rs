use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct Db {
    pub pool: PgPool,
}

impl Db {
    // SECURITY: never include raw DSNs in tracing spans (they may contain credentials).
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let connect_options = PgConnectOptions::from_str(database_url)?;

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(connect_options)
            .await?;
        info!("connected to db");
        Ok(Self { pool })
    }

    /// Idempotent schema bootstrap, run once at startup.
    ///
    /// The games table deliberately carries no uniqueness constraint on
    /// name; duplicate suppression happens in the ingest pipeline only.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS games (
                id BIGSERIAL PRIMARY KEY,
                publisher_id BIGINT,
                name TEXT NOT NULL,
                platform TEXT NOT NULL,
                store_id BIGINT,
                bundle_id TEXT,
                app_version TEXT,
                is_published BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
             )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
