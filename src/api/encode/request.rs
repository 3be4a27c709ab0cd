// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request types for the encode endpoints

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Maximum number of images accepted in one batch request
pub const MAX_BATCH_SIZE: usize = 64;

/// Maximum text length in characters
pub const MAX_TEXT_LENGTH: usize = 8192;

/// Request body for POST /v1/encode
///
/// # Example
/// ```json
/// { "image": "https://cdn.example.com/products/123.jpg" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeImageRequest {
    /// Remote URL, data URL, or base64-encoded image
    pub image: String,
}

impl EncodeImageRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.image.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "image".to_string(),
                message: "image cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Request body for POST /v1/encode-batch
///
/// # Example
/// ```json
/// { "images": ["https://...", "data:image/png;base64,..."] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeBatchRequest {
    /// Image inputs (1-64 items); each is a URL or base64 payload
    pub images: Vec<String>,
}

impl EncodeBatchRequest {
    /// Validates the batch request
    ///
    /// # Validation Rules
    /// 1. **images**: Must contain 1-64 items
    /// 2. **items**: No item may be empty or whitespace-only
    ///
    /// Decodability is not checked here: a syntactically present item that
    /// turns out to be corrupt is skipped by the pipeline, not rejected up
    /// front.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.images.is_empty() {
            return Err(ApiError::ValidationError {
                field: "images".to_string(),
                message: "images array must contain at least 1 item".to_string(),
            });
        }

        if self.images.len() > MAX_BATCH_SIZE {
            return Err(ApiError::ValidationError {
                field: "images".to_string(),
                message: format!(
                    "images array cannot contain more than {} items (got {})",
                    MAX_BATCH_SIZE,
                    self.images.len()
                ),
            });
        }

        for (index, image) in self.images.iter().enumerate() {
            if image.trim().is_empty() {
                return Err(ApiError::ValidationError {
                    field: format!("images[{}]", index),
                    message: "image cannot be empty or contain only whitespace".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Request body for POST /v1/encode-text
///
/// # Example
/// ```json
/// { "text": "red leather handbag" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodeTextRequest {
    /// Query text to embed
    pub text: String,
}

impl EncodeTextRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.text.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "text".to_string(),
                message: "text cannot be empty or contain only whitespace".to_string(),
            });
        }

        if self.text.len() > MAX_TEXT_LENGTH {
            return Err(ApiError::ValidationError {
                field: "text".to_string(),
                message: format!(
                    "text cannot exceed {} characters (got {} characters)",
                    MAX_TEXT_LENGTH,
                    self.text.len()
                ),
            });
        }

        Ok(())
    }
}
