// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image source resolution: remote URLs and inline base64 payloads

use crate::vision::image_utils::{decode_image_bytes, decode_inline_image, DecodeError};
use anyhow::{Context, Result};
use image::RgbImage;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default timeout for remote image retrieval
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Resolves opaque input strings into decoded RGB images
///
/// Inputs with an `http://` or `https://` scheme are fetched over the
/// network with a bounded timeout (single attempt, no retries); everything
/// else is treated as an inline base64 payload. The decoded result is
/// always coerced to 8-bit RGB regardless of the source channel layout.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    /// Creates a fetcher with the given remote retrieval timeout
    pub fn new(fetch_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(fetch_timeout)
            .build()
            .context("Failed to build HTTP client for image fetching")?;

        Ok(Self { client })
    }

    /// Resolve a raw input string into a decoded RGB image
    ///
    /// # Arguments
    /// * `input` - Remote URL, data URL, or bare base64 image payload
    ///
    /// # Returns
    /// * `Ok(RgbImage)` - 3-channel image ready for preprocessing
    /// * `Err(DecodeError)` - Malformed input, fetch failure, or undecodable payload
    pub async fn resolve(&self, input: &str) -> Result<RgbImage, DecodeError> {
        let image = if is_remote_url(input) {
            self.fetch_remote(input).await?
        } else {
            decode_inline_image(input)?
        };

        debug!(
            "Resolved input image: {}x{} pixels",
            image.width(),
            image.height()
        );

        // Grayscale, palette and alpha sources all collapse to RGB8 here;
        // the encoder requires a uniform channel shape.
        Ok(image.to_rgb8())
    }

    /// Fetch and decode an image from a remote URL (single attempt)
    async fn fetch_remote(&self, url: &str) -> Result<image::DynamicImage, DecodeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DecodeError::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DecodeError::FetchStatus(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DecodeError::FetchFailed(e.to_string()))?;

        decode_image_bytes(&bytes)
    }
}

/// Returns true if the input should be resolved via remote fetch
fn is_remote_url(input: &str) -> bool {
    url::Url::parse(input)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
