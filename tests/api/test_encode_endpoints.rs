// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end endpoint tests against the router
//!
//! These drive the full HTTP surface (routing, validation, pipeline, error
//! envelope) with a mock Encoder, so no model files are required.

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clip_embed_service::api::{create_app, AppState};
use clip_embed_service::embeddings::{EmbeddingPipeline, Encoder};
use clip_embed_service::vision::ImageFetcher;
use image::{Rgb, RgbImage};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot`

const DIMENSION: usize = 16;

/// Minimal deterministic encoder for endpoint tests
struct StubEncoder;

#[async_trait]
impl Encoder for StubEncoder {
    async fn embed_images(&self, images: &[RgbImage]) -> Result<Vec<Vec<f32>>> {
        Ok(images
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let mut v = vec![0.0; DIMENSION];
                v[i % DIMENSION] = 2.0; // unnormalized on purpose
                v
            })
            .collect())
    }

    async fn embed_text(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![3.0; DIMENSION])
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn model_name(&self) -> &str {
        "stub-clip"
    }
}

fn test_app() -> axum::Router {
    let fetcher = ImageFetcher::new(Duration::from_secs(5)).unwrap();
    let pipeline = Arc::new(EmbeddingPipeline::new(fetcher, Arc::new(StubEncoder)));
    create_app(AppState { pipeline })
}

/// Base64-encoded PNG of a 2x2 solid-color image
fn png_base64(color: [u8; 3]) -> String {
    let img = RgbImage::from_pixel(2, 2, Rgb(color));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    STANDARD.encode(&buf)
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_encode_single_image_ok() {
    let app = test_app();
    let body = format!(r#"{{"image": "{}"}}"#, png_base64([255, 0, 0]));

    let response = app.oneshot(post_json("/v1/encode", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["dims"], DIMENSION);
    assert_eq!(json["embedding"].as_array().unwrap().len(), DIMENSION);
    assert!(json["processingTimeMs"].as_f64().unwrap() >= 0.0);

    // The stub returns an unnormalized vector; the pipeline must have
    // rescaled it to unit length.
    let norm: f64 = json["embedding"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap().powi(2))
        .sum::<f64>()
        .sqrt();
    assert!((norm - 1.0).abs() < 1e-4);
}

#[tokio::test]
async fn test_encode_single_image_decode_error() {
    let app = test_app();
    let body = r#"{"image": "not-an-image"}"#.to_string();

    let response = app.oneshot(post_json("/v1/encode", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error_type"], "decode_error");
    assert!(json["message"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn test_encode_batch_partial_failure() {
    let app = test_app();
    let body = format!(
        r#"{{"images": ["{}", "corrupt-bytes", "{}"]}}"#,
        png_base64([255, 0, 0]),
        png_base64([0, 0, 255])
    );

    let response = app
        .oneshot(post_json("/v1/encode-batch", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["embeddings"].as_array().unwrap().len(), 2);
    assert_eq!(json["failedIndices"], serde_json::json!([1]));
    assert_eq!(json["dims"], DIMENSION);
}

#[tokio::test]
async fn test_encode_batch_all_failed() {
    let app = test_app();
    let body = r#"{"images": ["bad-1", "bad-2"]}"#.to_string();

    let response = app
        .oneshot(post_json("/v1/encode-batch", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error_type"], "no_valid_input");
}

#[tokio::test]
async fn test_encode_batch_empty_array_rejected() {
    let app = test_app();
    let body = r#"{"images": []}"#.to_string();

    let response = app
        .oneshot(post_json("/v1/encode-batch", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error_type"], "validation_error");
}

#[tokio::test]
async fn test_encode_text_ok() {
    let app = test_app();
    let body = r#"{"text": "red leather handbag"}"#.to_string();

    let response = app
        .oneshot(post_json("/v1/encode-text", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["dims"], DIMENSION);
    assert_eq!(json["embedding"].as_array().unwrap().len(), DIMENSION);
}

#[tokio::test]
async fn test_encode_text_empty_rejected() {
    let app = test_app();
    let body = r#"{"text": "   "}"#.to_string();

    let response = app
        .oneshot(post_json("/v1/encode-text", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_model_and_dims() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model"], "stub-clip");
    assert_eq!(json["dims"], DIMENSION);
    assert_eq!(json["ready"], true);
}

#[tokio::test]
async fn test_encode_rejects_get() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/v1/encode")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
