// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Encoder capability contract
//!
//! The pipeline treats the embedding model as a pluggable capability behind
//! this trait so tests can substitute a mock and the production ONNX
//! implementation stays swappable.

use anyhow::Result;
use async_trait::async_trait;
use image::RgbImage;

/// Dual image/text embedding model
///
/// Implementations must be pure with respect to service state: no input is
/// retained after a call returns, and a fixed input with a fixed model
/// version always produces the same output (no dropout, no sampling at
/// inference time).
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Embed a batch of decoded images
    ///
    /// Order-preserving: output length equals input length, and the vector
    /// at index `i` corresponds to `images[i]`. Every vector has length
    /// `dimension()`.
    async fn embed_images(&self, images: &[RgbImage]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text string into a vector of length `dimension()`
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;

    /// Declared output dimensionality, fixed for the process lifetime
    fn dimension(&self) -> usize;

    /// Model name for health reporting
    fn model_name(&self) -> &str;
}
