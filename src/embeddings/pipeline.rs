// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedding request pipeline
//!
//! Wires the image source resolver, the encoder capability and the
//! normalizer into the three operations the API exposes: single image,
//! image batch, and text. All state is per-request; the encoder is an
//! immutable shared capability loaded once at startup.

use crate::embeddings::batch::assemble;
use crate::embeddings::encoder::Encoder;
use crate::embeddings::normalize::l2_normalize;
use crate::vision::{DecodeError, ImageFetcher};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Pipeline failure kinds, mapped to client-visible outcomes by the API layer
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to decode input: {0}")]
    Decode(#[from] DecodeError),

    #[error("No valid images to process")]
    EmptyBatch,

    #[error("Encoder invocation failed: {0}")]
    Encoder(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Outcome of a batch encode: survivor vectors plus the dropped indices
#[derive(Debug)]
pub struct BatchOutcome {
    /// One normalized vector per successfully decoded input, in the
    /// relative order of the survivors
    pub embeddings: Vec<Vec<f32>>,
    /// Original request indices of the inputs that failed to decode
    pub failed_indices: Vec<usize>,
}

/// The embedding request pipeline
///
/// Holds the resolver and an immutable `Encoder` capability. Every
/// operation decodes within the request, invokes the encoder, and
/// L2-normalizes each output vector.
pub struct EmbeddingPipeline {
    fetcher: ImageFetcher,
    encoder: Arc<dyn Encoder>,
}

impl EmbeddingPipeline {
    pub fn new(fetcher: ImageFetcher, encoder: Arc<dyn Encoder>) -> Self {
        Self { fetcher, encoder }
    }

    /// Declared output dimensionality, echoed in every successful response
    pub fn dimension(&self) -> usize {
        self.encoder.dimension()
    }

    /// Model name for health reporting
    pub fn model_name(&self) -> &str {
        self.encoder.model_name()
    }

    /// Whether the pipeline can serve requests
    ///
    /// Startup is fail-fast: the pipeline only exists once the encoder has
    /// loaded, so a constructed pipeline is always ready.
    pub fn is_ready(&self) -> bool {
        true
    }

    /// Encode a single image input into one normalized vector
    pub async fn encode_image(&self, input: &str) -> Result<Vec<f32>, PipelineError> {
        let image = self.fetcher.resolve(input).await?;

        let mut vectors = self
            .encoder
            .embed_images(std::slice::from_ref(&image))
            .await
            .map_err(|e| PipelineError::Encoder(e.to_string()))?;

        if vectors.len() != 1 {
            return Err(PipelineError::Internal(format!(
                "Encoder returned {} vectors for 1 image",
                vectors.len()
            )));
        }

        let mut vector = vectors.pop().expect("length checked above");
        self.check_dimension(&vector)?;
        l2_normalize(&mut vector);

        Ok(vector)
    }

    /// Encode a batch of image inputs
    ///
    /// Per-item decode failures are absorbed (skipped, logged, reported via
    /// `failed_indices`); only an empty batch or an encoder failure surfaces
    /// as an error.
    pub async fn encode_image_batch(
        &self,
        inputs: &[String],
    ) -> Result<BatchOutcome, PipelineError> {
        let batch = assemble(&self.fetcher, inputs).await?;

        debug!(
            "Assembled batch: {} of {} inputs decoded",
            batch.images.len(),
            inputs.len()
        );

        let mut embeddings = self
            .encoder
            .embed_images(&batch.images)
            .await
            .map_err(|e| PipelineError::Encoder(e.to_string()))?;

        if embeddings.len() != batch.images.len() {
            return Err(PipelineError::Internal(format!(
                "Encoder returned {} vectors for {} images",
                embeddings.len(),
                batch.images.len()
            )));
        }

        for vector in &mut embeddings {
            self.check_dimension(vector)?;
            l2_normalize(vector);
        }

        Ok(BatchOutcome {
            embeddings,
            failed_indices: batch.failed_indices(),
        })
    }

    /// Encode a text string into one normalized vector
    pub async fn encode_text(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let mut vector = self
            .encoder
            .embed_text(text)
            .await
            .map_err(|e| PipelineError::Encoder(e.to_string()))?;

        self.check_dimension(&vector)?;
        l2_normalize(&mut vector);

        Ok(vector)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), PipelineError> {
        let expected = self.encoder.dimension();
        if vector.len() != expected {
            return Err(PipelineError::Encoder(format!(
                "Encoder produced a {}-dimensional vector, expected {}",
                vector.len(),
                expected
            )));
        }
        Ok(())
    }
}
