pub mod api;
pub mod appointments;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod jobs;
pub mod metrics;
pub mod repo;
pub mod reviews;
pub mod telemetry;

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::routes;
use crate::config::Config;
use crate::gateway::whatsapp::WhatsAppGateway;
use crate::gateway::MessagingGateway;
use crate::repo::postgres::PgRepository;
use crate::repo::Repository;

pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub repo: Arc<dyn Repository>,
    /// None when gateway credentials are absent; job triggers then fail
    /// fast with a configuration error.
    pub gateway: Option<Arc<dyn MessagingGateway>>,
}

pub struct App {
    state: Arc<AppState>,
}

impl App {
    pub fn db(&self) -> &PgPool {
        &self.state.db
    }

    pub async fn new(config: Config) -> Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&db).await?;

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let gateway: Option<Arc<dyn MessagingGateway>> = config
            .whatsapp
            .clone()
            .map(|credentials| {
                Arc::new(WhatsAppGateway::new(credentials, http_client)) as Arc<dyn MessagingGateway>
            });

        let state = Arc::new(AppState {
            db: db.clone(),
            repo: Arc::new(PgRepository::new(db)),
            gateway,
            config,
        });

        Ok(Self { state })
    }

    pub fn router(&self) -> Router {
        routes::build(self.state.clone())
    }
}
