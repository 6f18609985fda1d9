//! Web front end: upload form, campaign results and downloads.

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::{error, info};

use crate::config::ApiConfig;
use crate::constants::MAX_UPLOAD_BYTES;

mod csrf;
mod prelude;
mod store;
mod upload;
mod views;

use store::CampaignStore;
use views::{download_handler, generate_handler, index_handler, variation_image_handler};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    config: Arc<ApiConfig>,
    campaigns: CampaignStore,
}

impl AppState {
    fn new(config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
            campaigns: CampaignStore::default(),
        }
    }
}

fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", axum::routing::get(index_handler))
        .route("/generate", axum::routing::post(generate_handler))
        .route(
            "/campaigns/{id}/variations/{number}",
            axum::routing::get(variation_image_handler),
        )
        .route("/campaigns/{id}/download", axum::routing::get(download_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
}

/// The router with state, sessions and request limits applied.
fn build_app(state: AppState) -> Router {
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(1)));

    create_router()
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
    }
    info!("Shutting down");
}

/// Serves the web front end until interrupted.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    config: ApiConfig,
) -> Result<(), anyhow::Error> {
    let app = build_app(AppState::new(config));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    Ok(())
}
