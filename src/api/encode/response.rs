// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Response types for the encode endpoints

use crate::embeddings::BatchOutcome;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Response body for single-item encodes (image and text)
///
/// # Example
/// ```json
/// {
///   "embedding": [0.01, -0.04, ...],
///   "dims": 512,
///   "processingTimeMs": 42.17
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingResponse {
    /// L2-normalized embedding vector
    pub embedding: Vec<f32>,

    /// Declared dimensionality, echoed for client-side validation
    pub dims: usize,

    /// Wall-clock processing time in milliseconds (2 decimal digits)
    pub processing_time_ms: f64,
}

impl EmbeddingResponse {
    pub fn new(embedding: Vec<f32>, dims: usize, started: Instant) -> Self {
        Self {
            embedding,
            dims,
            processing_time_ms: elapsed_ms(started),
        }
    }
}

/// Response body for POST /v1/encode-batch
///
/// `embeddings` is compacted: failed inputs are dropped and the survivors
/// keep their relative order. `failed_indices` maps the drops back to
/// positions in the request's `images` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEmbeddingResponse {
    /// One normalized vector per successfully decoded input
    pub embeddings: Vec<Vec<f32>>,

    /// Declared dimensionality, echoed for client-side validation
    pub dims: usize,

    /// Number of embeddings returned
    pub count: usize,

    /// Request indices of inputs that failed to decode and were skipped
    pub failed_indices: Vec<usize>,

    /// Wall-clock processing time in milliseconds (2 decimal digits)
    pub processing_time_ms: f64,
}

impl BatchEmbeddingResponse {
    pub fn new(outcome: BatchOutcome, dims: usize, started: Instant) -> Self {
        let count = outcome.embeddings.len();
        Self {
            embeddings: outcome.embeddings,
            dims,
            count,
            failed_indices: outcome.failed_indices,
            processing_time_ms: elapsed_ms(started),
        }
    }
}

/// Elapsed wall-clock milliseconds since `started`, rounded to 2 decimals
pub fn elapsed_ms(started: Instant) -> f64 {
    round2(started.elapsed().as_secs_f64() * 1000.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
