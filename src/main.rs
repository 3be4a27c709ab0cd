// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clip_embed_service::{
    api::start_server,
    config::ServiceConfig,
    embeddings::{ClipModelConfig, ClipOnnxEncoder, EmbeddingPipeline},
    vision::ImageFetcher,
};
use std::{env, net::SocketAddr, sync::Arc, time::Duration};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::from_env();

    info!("🚀 Starting CLIP embedding service");
    info!("   Model: {}", config.model_name);
    info!("   Dimensions: {}", config.embedding_dims);

    // Load the encoder before binding: startup is fail-fast, and the
    // service must never report ready without a working model.
    let encoder = ClipOnnxEncoder::new(ClipModelConfig {
        model_name: config.model_name.clone(),
        vision_model_path: config.vision_model_path.clone(),
        text_model_path: config.text_model_path.clone(),
        tokenizer_path: config.tokenizer_path.clone(),
        dimension: config.embedding_dims,
    })
    .await?;

    let fetcher = ImageFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
    let pipeline = Arc::new(EmbeddingPipeline::new(fetcher, Arc::new(encoder)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    start_server(addr, pipeline).await?;

    Ok(())
}
