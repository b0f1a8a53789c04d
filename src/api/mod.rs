//! HTTP surface: a single upload endpoint plus a health check.

pub mod errors;
pub mod handler;
pub mod response;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::reader::MeterReader;

pub use errors::ApiError;
pub use handler::{health_handler, process_image_handler};
pub use response::{ErrorDetail, ProcessImageResponse};

#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<MeterReader>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(reader: MeterReader) -> Self {
        Self {
            reader: Arc::new(reader),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/process-image", post(process_image_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until ctrl-c
pub async fn start_server(config: &ServerConfig, reader: MeterReader) -> anyhow::Result<()> {
    let state = AppState::new(reader).with_max_upload_bytes(config.max_upload_bytes);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("API server listening on {}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
