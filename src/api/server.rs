// API server implementation using actix-web

use crate::api::{middleware, routes};
use crate::database_ops::catalog::CatalogProvider;
use crate::database_ops::db::Db;
use crate::database_ops::populate::{sources_from_env, IngestState};
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use std::env;

pub struct ApiServer {
    pub host: String,
    pub port: u16,
    pub allowed_origins: String,
    pub static_dir: String,
    pub catalog_timeout_secs: u64,
}

impl ApiServer {
    /// Create server from environment variables
    pub fn from_env() -> Result<Self> {
        crate::util::env::init_env();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("Invalid API_PORT")?;

        let allowed_origins = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string());

        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "./static".to_string());

        let catalog_timeout_secs = crate::util::env::env_parse("CATALOG_TIMEOUT_SECS", 15u64);

        Ok(Self {
            host,
            port,
            allowed_origins,
            static_dir,
            catalog_timeout_secs,
        })
    }

    /// Start the HTTP server.
    ///
    /// This is the composition root: the storage handle, catalog provider
    /// and ingest state are constructed here and handed to the app as
    /// shared data; nothing lives in process-wide statics.
    pub async fn run(self, db: Db) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);

        tracing::info!(
            host = %self.host,
            port = %self.port,
            "starting games API server"
        );

        let provider = CatalogProvider::new(Some(self.catalog_timeout_secs))?;
        let ingest = web::Data::new(IngestState::new(provider, sources_from_env()));
        let db_data = web::Data::new(db);
        let allowed_origins = self.allowed_origins.clone();
        let static_dir = self.static_dir.clone();

        HttpServer::new(move || {
            let (logger, compress) = middleware::setup_middleware();
            let cors = middleware::setup_cors(&allowed_origins);

            App::new()
                .app_data(db_data.clone())
                .app_data(ingest.clone())
                .wrap(logger)
                .wrap(compress)
                .wrap(cors)
                .configure(routes::configure_routes)
                .service(
                    actix_files::Files::new("/", static_dir.clone()).index_file("index.html"),
                )
        })
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind to {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

        Ok(())
    }
}
