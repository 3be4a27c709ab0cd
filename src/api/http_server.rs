// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

use crate::api::encode::{encode_batch_handler, encode_image_handler, encode_text_handler};
use crate::embeddings::EmbeddingPipeline;

/// Shared state for all request handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EmbeddingPipeline>,
}

/// Health check payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub dims: usize,
    pub ready: bool,
}

/// Build the service router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Encode endpoints
        .route("/v1/encode", post(encode_image_handler))
        .route("/v1/encode-batch", post(encode_batch_handler))
        .route("/v1/encode-text", post(encode_text_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn start_server(addr: SocketAddr, pipeline: Arc<EmbeddingPipeline>) -> anyhow::Result<()> {
    let app = create_app(AppState { pipeline });

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let health = HealthResponse {
        status: "healthy".to_string(),
        model: state.pipeline.model_name().to_string(),
        dims: state.pipeline.dimension(),
        ready: state.pipeline.is_ready(),
    };

    axum::response::Json(health)
}
