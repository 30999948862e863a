// HTTP API server binary: CRUD and search over games, plus catalog populate

use anyhow::Result;
use games_api::api::ApiServer;
use games_api::database_ops::db::Db;
use games_api::util::env as env_util;

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    env_util::init_env();

    let server = ApiServer::from_env()?;

    let database_url = env_util::env_req("DATABASE_URL")?;
    let max_connections: u32 = env_util::env_parse("DB_MAX_CONNS", 10u32);
    let db = Db::connect(&database_url, max_connections).await?;
    db.ensure_schema().await?;

    server.run(db).await?;

    Ok(())
}
