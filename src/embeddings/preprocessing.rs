// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the CLIP vision tower

use image::{imageops, imageops::FilterType, Rgb, RgbImage};
use ndarray::Array4;

/// Input size for the CLIP vision encoder
pub const CLIP_INPUT_SIZE: u32 = 224;

/// CLIP normalization mean values
pub const MEAN: [f32; 3] = [0.48145466, 0.4578275, 0.40821073];

/// CLIP normalization std values
pub const STD: [f32; 3] = [0.26862954, 0.26130258, 0.27577711];

/// Preprocess a batch of decoded images for the CLIP vision encoder
///
/// Steps, per image:
/// 1. Resize the shorter side to CLIP_INPUT_SIZE and center crop (the
///    canonical CLIP transform, no aspect distortion)
/// 2. Normalize with CLIP mean/std: (pixel/255 - mean) / std
/// 3. Write into an NCHW tensor slot
///
/// The output shape is `[N, 3, 224, 224]`, one dense slot per image in
/// input order.
pub fn preprocess_batch(images: &[RgbImage]) -> Array4<f32> {
    let size = CLIP_INPUT_SIZE as usize;
    let mut tensor = Array4::zeros((images.len(), 3, size, size));

    for (n, image) in images.iter().enumerate() {
        let rgb = resize_center_crop(image, CLIP_INPUT_SIZE);

        for y in 0..size {
            for x in 0..size {
                let pixel = rgb.get_pixel(x as u32, y as u32);
                for c in 0..3 {
                    let normalized = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
                    tensor[[n, c, y, x]] = normalized;
                }
            }
        }
    }

    tensor
}

/// Resize keeping aspect ratio, then center crop to a square target
pub fn resize_center_crop(image: &RgbImage, target_size: u32) -> RgbImage {
    let (orig_w, orig_h) = image.dimensions();

    if orig_w == 0 || orig_h == 0 {
        return RgbImage::from_pixel(target_size, target_size, Rgb([0, 0, 0]));
    }

    // Scale so the shorter side covers the target
    let scale_w = target_size as f32 / orig_w as f32;
    let scale_h = target_size as f32 / orig_h as f32;
    let scale = scale_w.max(scale_h);

    let new_w = ((orig_w as f32 * scale).round() as u32).max(target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).max(target_size);

    let resized = imageops::resize(image, new_w, new_h, FilterType::CatmullRom);

    let crop_x = (new_w - target_size) / 2;
    let crop_y = (new_h - target_size) / 2;

    imageops::crop_imm(&resized, crop_x, crop_y, target_size, target_size).to_image()
}
