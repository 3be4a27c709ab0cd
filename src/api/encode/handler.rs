// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP handlers for the encode endpoints
//!
//! Each handler validates the request, runs the embedding pipeline, and
//! composes the timed response. Pipeline failures are mapped to the JSON
//! error envelope; they never take the process down.

use crate::api::encode::{
    BatchEmbeddingResponse, EmbeddingResponse, EncodeBatchRequest, EncodeImageRequest,
    EncodeTextRequest,
};
use crate::api::errors::ApiErrorResponse;
use crate::api::http_server::AppState;
use axum::{extract::State, Json};
use std::time::Instant;
use tracing::info;

/// POST /v1/encode handler
///
/// Encodes a single image (URL or base64) into one normalized embedding.
pub async fn encode_image_handler(
    State(state): State<AppState>,
    Json(request): Json<EncodeImageRequest>,
) -> Result<Json<EmbeddingResponse>, ApiErrorResponse> {
    let started = Instant::now();
    request.validate()?;

    let embedding = state.pipeline.encode_image(&request.image).await?;

    Ok(Json(EmbeddingResponse::new(
        embedding,
        state.pipeline.dimension(),
        started,
    )))
}

/// POST /v1/encode-batch handler
///
/// Encodes up to 64 images in one model invocation. Items that fail to
/// decode are skipped and reported via `failedIndices`; the request only
/// fails when no item survives.
pub async fn encode_batch_handler(
    State(state): State<AppState>,
    Json(request): Json<EncodeBatchRequest>,
) -> Result<Json<BatchEmbeddingResponse>, ApiErrorResponse> {
    let started = Instant::now();
    request.validate()?;

    let outcome = state.pipeline.encode_image_batch(&request.images).await?;

    if !outcome.failed_indices.is_empty() {
        info!(
            "Batch encode: {} of {} inputs skipped",
            outcome.failed_indices.len(),
            request.images.len()
        );
    }

    Ok(Json(BatchEmbeddingResponse::new(
        outcome,
        state.pipeline.dimension(),
        started,
    )))
}

/// POST /v1/encode-text handler
///
/// Encodes a query string into the same embedding space as the images
/// (for text-to-image search).
pub async fn encode_text_handler(
    State(state): State<AppState>,
    Json(request): Json<EncodeTextRequest>,
) -> Result<Json<EmbeddingResponse>, ApiErrorResponse> {
    let started = Instant::now();
    request.validate()?;

    let embedding = state.pipeline.encode_text(&request.text).await?;

    Ok(Json(EmbeddingResponse::new(
        embedding,
        state.pipeline.dimension(),
        started,
    )))
}
