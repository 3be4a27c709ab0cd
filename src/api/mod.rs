// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod encode;
pub mod errors;
pub mod http_server;

pub use encode::{
    encode_batch_handler, encode_image_handler, encode_text_handler, BatchEmbeddingResponse,
    EmbeddingResponse, EncodeBatchRequest, EncodeImageRequest, EncodeTextRequest,
};
pub use errors::{ApiError, ApiErrorResponse, ErrorResponse};
pub use http_server::{create_app, start_server, AppState, HealthResponse};
