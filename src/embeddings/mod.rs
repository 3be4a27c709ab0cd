// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedding pipeline: batch assembly, encoder contract, normalization

pub mod batch;
pub mod clip_onnx;
pub mod encoder;
pub mod normalize;
pub mod pipeline;
pub mod preprocessing;

pub use batch::{assemble, AssembledBatch, BatchFailure};
pub use clip_onnx::{ClipModelConfig, ClipOnnxEncoder};
pub use encoder::Encoder;
pub use normalize::{l2_norm, l2_normalize};
pub use pipeline::{BatchOutcome, EmbeddingPipeline, PipelineError};
pub use preprocessing::{preprocess_batch, resize_center_crop, CLIP_INPUT_SIZE};
