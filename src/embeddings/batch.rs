// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Batch assembly with per-item failure isolation
//!
//! Batch endpoints exist to amortize model-invocation overhead across many
//! items; one corrupt image must not waste the whole batch. Each input is
//! resolved independently and failures are collected instead of aborting.

use crate::embeddings::pipeline::PipelineError;
use crate::vision::{DecodeError, ImageFetcher};
use image::RgbImage;
use tracing::warn;

/// A batch item that failed to decode, with its original request index
#[derive(Debug)]
pub struct BatchFailure {
    /// Index of the item in the request's input order
    pub index: usize,
    /// Why resolution failed
    pub reason: DecodeError,
}

/// Result of resolving a batch of raw inputs
///
/// `images` holds the survivors in the relative order of the inputs that
/// succeeded; `failures` records the dropped items so callers can map the
/// compacted output back to request positions.
#[derive(Debug, Default)]
pub struct AssembledBatch {
    pub images: Vec<RgbImage>,
    pub failures: Vec<BatchFailure>,
}

impl AssembledBatch {
    /// Original request indices of the items that failed to decode
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }
}

/// Resolve every input independently, skipping items that fail to decode
///
/// A per-item failure is logged and recorded, never retried, and never
/// aborts the batch. Returns `PipelineError::EmptyBatch` when zero items
/// survive.
pub async fn assemble(
    fetcher: &ImageFetcher,
    inputs: &[String],
) -> Result<AssembledBatch, PipelineError> {
    let mut batch = AssembledBatch::default();

    for (index, input) in inputs.iter().enumerate() {
        // Explicit per-item result: the partial-failure policy lives here,
        // not in control flow further up.
        let item: Result<RgbImage, DecodeError> = fetcher.resolve(input).await;

        match item {
            Ok(image) => batch.images.push(image),
            Err(reason) => {
                warn!("Skipping batch item {}: {}", index, reason);
                batch.failures.push(BatchFailure { index, reason });
            }
        }
    }

    if batch.images.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }

    Ok(batch)
}
