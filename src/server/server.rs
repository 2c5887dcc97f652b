use anyhow::{anyhow, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::token_route::{SharedCache, TokenState};

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub token_state: TokenState,
}

impl AppState {
    pub fn new(metrics: &Metrics, cache: SharedCache) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            token_state: TokenState::new(cache),
        }
    }
}

pub async fn router(settings_config: &SettingsConfig, cache: SharedCache) -> Router {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, cache);

    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(state.token_state.router(&settings_config.token_path))
        .with_state(state)
}

/// Serve the token and metrics routes until the listener fails.
pub async fn start(settings_config: &SettingsConfig, cache: SharedCache) -> Result<()> {
    let app = router(settings_config, cache).await;

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow!("cannot bind '{}': {}", bind_addr, e))?;
    info!("serving token on http://{}{}", bind_addr, settings_config.token_path);

    get_metrics().await.up.set(1);
    axum::serve(listener, app).await?;
    Ok(())
}
