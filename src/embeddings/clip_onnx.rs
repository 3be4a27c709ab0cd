// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ONNX CLIP Encoder
//!
//! This module wraps ONNX Runtime to run a CLIP-family dual encoder
//! (fashion-clip by default): a vision tower for images and a text tower
//! for queries, projected into the same embedding space.
//!
//! Features:
//! - Vision + text session loading from disk
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - CLIP tokenization with truncation to the model context length
//! - Batch image inference and single text inference
//! - Load-time dimensionality probe

use crate::embeddings::encoder::Encoder;
use crate::embeddings::preprocessing::{preprocess_batch, CLIP_INPUT_SIZE};
use anyhow::{Context, Result};
use async_trait::async_trait;
use image::RgbImage;
use ndarray::{Array2, Array4, ArrayViewD, IxDyn};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{info, warn};

/// CLIP's text context length
const MAX_TEXT_TOKENS: usize = 77;

/// Configuration for loading the CLIP encoder
#[derive(Debug, Clone)]
pub struct ClipModelConfig {
    /// Model name (e.g., "fashion-clip")
    pub model_name: String,
    /// Path to the vision tower ONNX file
    pub vision_model_path: String,
    /// Path to the text tower ONNX file
    pub text_model_path: String,
    /// Path to tokenizer JSON file
    pub tokenizer_path: String,
    /// Declared embedding dimensionality (validated at load time)
    pub dimension: usize,
}

/// ONNX-based CLIP dual encoder
///
/// Both towers output projected features of the same declared
/// dimensionality, validated with a probe inference at load.
///
/// # Thread Safety
/// Each session sits behind `Arc<Mutex<...>>`: concurrent requests queue at
/// the model boundary instead of spawning unbounded invocations. The mutex
/// is only held for the synchronous `run` call.
#[derive(Clone)]
pub struct ClipOnnxEncoder {
    /// Vision tower session
    vision_session: Arc<Mutex<Session>>,

    /// Text tower session
    text_session: Arc<Mutex<Session>>,

    /// CLIP tokenizer
    tokenizer: Arc<Tokenizer>,

    /// Vision tower input name (usually "pixel_values")
    vision_input: String,

    /// Model name (e.g., "fashion-clip")
    model_name: String,

    /// Output dimension (512 for fashion-clip)
    dimension: usize,
}

impl std::fmt::Debug for ClipOnnxEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipOnnxEncoder")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("vision_input", &self.vision_input)
            .finish_non_exhaustive()
    }
}

impl ClipOnnxEncoder {
    /// Creates a new CLIP encoder from disk paths
    ///
    /// # Errors
    /// Returns error if:
    /// - A model or tokenizer file is not found or invalid
    /// - ONNX Runtime initialization fails
    /// - The vision tower's probe output does not match the declared
    ///   dimensionality
    ///
    /// # Example
    /// ```ignore
    /// let encoder = ClipOnnxEncoder::new(ClipModelConfig {
    ///     model_name: "fashion-clip".to_string(),
    ///     vision_model_path: "./models/fashion-clip-onnx/vision_model.onnx".to_string(),
    ///     text_model_path: "./models/fashion-clip-onnx/text_model.onnx".to_string(),
    ///     tokenizer_path: "./models/fashion-clip-onnx/tokenizer.json".to_string(),
    ///     dimension: 512,
    /// }).await?;
    /// ```
    pub async fn new(config: ClipModelConfig) -> Result<Self> {
        let vision_path = Path::new(&config.vision_model_path);
        let text_path = Path::new(&config.text_model_path);
        let tokenizer_path = Path::new(&config.tokenizer_path);

        if !vision_path.exists() {
            anyhow::bail!("Vision model file not found: {}", vision_path.display());
        }
        if !text_path.exists() {
            anyhow::bail!("Text model file not found: {}", text_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("🚀 Initializing CLIP encoder with GPU support");
        let mut vision_session = build_session(vision_path)?;
        let text_session = build_session(text_path)?;

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let vision_input = vision_session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "pixel_values".to_string());

        // Probe the vision tower to validate the declared dimensionality.
        // Wrap in a block to ensure outputs are dropped before moving session.
        {
            let size = CLIP_INPUT_SIZE as usize;
            let probe = Array4::<f32>::zeros((1, 3, size, size));

            let outputs = vision_session.run(ort::inputs![
                vision_input.as_str() => Value::from_array(probe)?
            ])?;

            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract probe output tensor")?;

            let probed_dim = output_tensor
                .shape()
                .last()
                .copied()
                .unwrap_or(0);

            if probed_dim != config.dimension {
                anyhow::bail!(
                    "Model outputs {} dimensions, expected {}",
                    probed_dim,
                    config.dimension
                );
            }
        } // outputs dropped here

        info!(
            "✅ CLIP encoder loaded: {} ({} dimensions)",
            config.model_name, config.dimension
        );

        Ok(Self {
            vision_session: Arc::new(Mutex::new(vision_session)),
            text_session: Arc::new(Mutex::new(text_session)),
            tokenizer: Arc::new(tokenizer),
            vision_input,
            model_name: config.model_name,
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl Encoder for ClipOnnxEncoder {
    /// Embeds a batch of decoded images
    ///
    /// Preprocesses the whole batch into one dense `[N, 3, 224, 224]`
    /// tensor and runs a single vision-tower inference.
    async fn embed_images(&self, images: &[RgbImage]) -> Result<Vec<Vec<f32>>> {
        if images.is_empty() {
            return Ok(vec![]);
        }

        let tensor = preprocess_batch(images);

        // Lock the session for the synchronous inference call
        let mut session = self.vision_session.lock().unwrap();
        let outputs = session.run(ort::inputs![
            self.vision_input.as_str() => Value::from_array(tensor)?
        ])?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract vision output tensor")?;

        extract_rows(&output_tensor, images.len(), self.dimension)
    }

    /// Embeds a single text string
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))?;

        // CLIP has a hard 77-token context; truncate rather than fail
        let token_count = encoding.get_ids().len().min(MAX_TEXT_TOKENS);

        let input_ids: Vec<i64> = encoding.get_ids()[..token_count]
            .iter()
            .map(|&id| id as i64)
            .collect();
        let attention_mask: Vec<i64> = encoding.get_attention_mask()[..token_count]
            .iter()
            .map(|&m| m as i64)
            .collect();

        let input_ids_array = Array2::from_shape_vec((1, token_count), input_ids)
            .context("Failed to create input_ids array")?;
        let attention_mask_array = Array2::from_shape_vec((1, token_count), attention_mask)
            .context("Failed to create attention_mask array")?;

        let mut session = self.text_session.lock().unwrap();
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?
        ])?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract text output tensor")?;

        let mut rows = extract_rows(&output_tensor, 1, self.dimension)?;
        Ok(rows.pop().expect("row count checked in extract_rows"))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Build an ONNX session for a model file, preferring CUDA with CPU fallback
fn build_session(model_path: &Path) -> Result<Session> {
    let cuda_result = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CUDAExecutionProvider::default().build()])
        .context("Failed to set CUDA execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(4)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path);

    match cuda_result {
        Ok(session) => {
            info!(
                "✅ CUDA execution provider initialized for {}",
                model_path.display()
            );
            Ok(session)
        }
        Err(e) => {
            warn!("⚠️  CUDA execution provider failed: {}", e);
            warn!("   Falling back to CPU execution provider");
            Session::builder()
                .context("Failed to create session builder")?
                .with_execution_providers([CPUExecutionProvider::default().build()])
                .context("Failed to set CPU execution provider")?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .context("Failed to set optimization level")?
                .with_intra_threads(4)
                .context("Failed to set intra threads")?
                .commit_from_file(model_path)
                .context(format!(
                    "Failed to load ONNX model from {}",
                    model_path.display()
                ))
        }
    }
}

/// Extract per-item embedding rows from a tower output
///
/// Accepts `[N, dim]` (projected features) as well as `[N, 1, dim]`
/// (exports that keep a singleton pooling axis).
fn extract_rows(
    output: &ArrayViewD<'_, f32>,
    expected_rows: usize,
    dimension: usize,
) -> Result<Vec<Vec<f32>>> {
    let shape = output.shape();

    let (rows, dim) = match shape.len() {
        2 => (shape[0], shape[1]),
        3 if shape[1] == 1 => (shape[0], shape[2]),
        _ => anyhow::bail!("Unexpected encoder output shape: {:?}", shape),
    };

    if rows != expected_rows {
        anyhow::bail!(
            "Encoder returned {} rows, expected {}",
            rows,
            expected_rows
        );
    }
    if dim != dimension {
        anyhow::bail!(
            "Unexpected embedding dimension: {} (expected {})",
            dim,
            dimension
        );
    }

    let mut embeddings = Vec::with_capacity(rows);
    for r in 0..rows {
        let mut row = Vec::with_capacity(dim);
        for d in 0..dim {
            let value = match shape.len() {
                2 => output[IxDyn(&[r, d])],
                _ => output[IxDyn(&[r, 0, d])],
            };
            row.push(value);
        }
        embeddings.push(row);
    }

    Ok(embeddings)
}
