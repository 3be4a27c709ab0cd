// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response serialization tests for the encode endpoints

use clip_embed_service::api::{BatchEmbeddingResponse, EmbeddingResponse};
use clip_embed_service::embeddings::BatchOutcome;
use std::time::Instant;

#[test]
fn test_embedding_response_fields() {
    let response = EmbeddingResponse::new(vec![0.6, 0.8], 2, Instant::now());

    assert_eq!(response.embedding, vec![0.6, 0.8]);
    assert_eq!(response.dims, 2);
    assert!(response.processing_time_ms >= 0.0);
}

#[test]
fn test_embedding_response_camel_case_json() {
    let response = EmbeddingResponse {
        embedding: vec![1.0, 0.0],
        dims: 2,
        processing_time_ms: 3.14,
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains(r#""processingTimeMs":3.14"#));
    assert!(json.contains(r#""embedding":[1.0,0.0]"#));
    assert!(json.contains(r#""dims":2"#));
}

#[test]
fn test_batch_response_reports_compaction() {
    let outcome = BatchOutcome {
        embeddings: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        failed_indices: vec![1],
    };
    let response = BatchEmbeddingResponse::new(outcome, 2, Instant::now());

    // 3 inputs, 1 failed: 2 vectors, index 1 reported as dropped
    assert_eq!(response.count, 2);
    assert_eq!(response.embeddings.len(), 2);
    assert_eq!(response.failed_indices, vec![1]);
    assert_eq!(response.dims, 2);
}

#[test]
fn test_batch_response_camel_case_json() {
    let response = BatchEmbeddingResponse {
        embeddings: vec![vec![1.0]],
        dims: 1,
        count: 1,
        failed_indices: vec![],
        processing_time_ms: 0.5,
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("failedIndices"));
    assert!(json.contains("processingTimeMs"));
}

#[test]
fn test_processing_time_has_two_decimals() {
    let response = EmbeddingResponse::new(vec![1.0], 1, Instant::now());

    // Rounded to 2 decimal digits: scaling by 100 yields an integer
    let scaled = response.processing_time_ms * 100.0;
    assert!((scaled - scaled.round()).abs() < 1e-9);
}

#[test]
fn test_responses_roundtrip() {
    let response = BatchEmbeddingResponse {
        embeddings: vec![vec![0.25, 0.75]],
        dims: 2,
        count: 1,
        failed_indices: vec![0, 2],
        processing_time_ms: 12.34,
    };

    let json = serde_json::to_string(&response).unwrap();
    let parsed: BatchEmbeddingResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.count, 1);
    assert_eq!(parsed.failed_indices, vec![0, 2]);
}
