// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod embeddings;
pub mod vision;

// Re-export main types
pub use api::{create_app, start_server, ApiError, AppState, ErrorResponse, HealthResponse};
pub use config::ServiceConfig;
pub use embeddings::{
    BatchOutcome, ClipModelConfig, ClipOnnxEncoder, EmbeddingPipeline, Encoder, PipelineError,
};
pub use vision::{DecodeError, ImageFetcher};
