// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Encode endpoints: single image, image batch, text

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{encode_batch_handler, encode_image_handler, encode_text_handler};
pub use request::{EncodeBatchRequest, EncodeImageRequest, EncodeTextRequest};
pub use response::{BatchEmbeddingResponse, EmbeddingResponse};
