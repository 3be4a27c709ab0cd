// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration from environment variables

use crate::vision::DEFAULT_FETCH_TIMEOUT_SECS;
use std::env;

/// Runtime configuration for the embedding service
///
/// All values come from environment variables (a `.env` file is honored),
/// with defaults matching the fashion-clip deployment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Port the HTTP API binds to
    pub api_port: u16,
    /// Model name reported by /health
    pub model_name: String,
    /// Path to the vision tower ONNX file
    pub vision_model_path: String,
    /// Path to the text tower ONNX file
    pub text_model_path: String,
    /// Path to the tokenizer JSON file
    pub tokenizer_path: String,
    /// Declared embedding dimensionality (validated against the model at load)
    pub embedding_dims: usize,
    /// Timeout for remote image retrieval, in seconds
    pub fetch_timeout_secs: u64,
}

impl ServiceConfig {
    /// Reads configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8899".to_string())
            .parse::<u16>()
            .unwrap_or(8899);

        let model_name =
            env::var("MODEL_NAME").unwrap_or_else(|_| "fashion-clip".to_string());

        let vision_model_path = env::var("VISION_MODEL_PATH")
            .unwrap_or_else(|_| "./models/fashion-clip-onnx/vision_model.onnx".to_string());

        let text_model_path = env::var("TEXT_MODEL_PATH")
            .unwrap_or_else(|_| "./models/fashion-clip-onnx/text_model.onnx".to_string());

        let tokenizer_path = env::var("TOKENIZER_PATH")
            .unwrap_or_else(|_| "./models/fashion-clip-onnx/tokenizer.json".to_string());

        let embedding_dims = env::var("EMBEDDING_DIMS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(512);

        let fetch_timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

        Self {
            api_port,
            model_name,
            vision_model_path,
            text_model_path,
            tokenizer_path,
            embedding_dims,
            fetch_timeout_secs,
        }
    }
}
