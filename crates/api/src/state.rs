use std::sync::Arc;

use crate::config::ServerConfig;
use crate::image_proxy;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ocwiki_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outbound HTTP client used by the image proxy.
    pub http: reqwest::Client,
}

impl AppState {
    /// Build the state, constructing the image proxy's HTTP client.
    pub fn new(pool: ocwiki_db::DbPool, config: ServerConfig) -> Result<Self, reqwest::Error> {
        let http = image_proxy::build_http_client(&config.image_proxy)?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            http,
        })
    }
}
