// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding for the embedding pipeline

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// Maximum image size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Errors produced while turning a raw input into a decoded image
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,

    #[error("Failed to fetch image: {0}")]
    FetchFailed(String),

    #[error("Image fetch returned HTTP status {0}")]
    FetchStatus(u16),
}

/// Decode an inline-encoded image string
///
/// Accepts plain base64 as well as data URLs (`data:image/png;base64,...`);
/// the self-describing header is stripped before decoding.
///
/// # Returns
/// * `Ok(DynamicImage)` - The decoded image
/// * `Err(DecodeError)` - If decoding fails
pub fn decode_inline_image(input: &str) -> Result<DynamicImage, DecodeError> {
    if input.is_empty() {
        return Err(DecodeError::EmptyData);
    }

    // Strip a data URL header if present (everything up to the first comma)
    let payload = if input.starts_with("data:") {
        input
            .split_once(',')
            .map(|(_, rest)| rest)
            .ok_or(DecodeError::EmptyData)?
    } else {
        input
    };

    if payload.is_empty() {
        return Err(DecodeError::EmptyData);
    }

    let bytes = STANDARD.decode(payload)?;
    decode_image_bytes(&bytes)
}

/// Decode raw image bytes (inline payloads and fetched bodies)
///
/// # Returns
/// * `Ok(DynamicImage)` - The decoded image
/// * `Err(DecodeError)` - If decoding fails
pub fn decode_image_bytes(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(DecodeError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    if bytes.is_empty() {
        return Err(DecodeError::EmptyData);
    }

    // Detect format from magic bytes
    let format = detect_format(bytes)?;

    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| DecodeError::DecodeFailed(e.to_string()))
}

/// Detect image format from magic bytes
///
/// # Returns
/// * `Ok(ImageFormat)` - Detected format
/// * `Err(DecodeError::UnsupportedFormat)` - If format cannot be detected
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, DecodeError> {
    if bytes.len() < 4 {
        return Err(DecodeError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(DecodeError::UnsupportedFormat),
    }
}
