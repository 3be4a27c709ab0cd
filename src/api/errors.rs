// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::embeddings::PipelineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// JSON error envelope returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,
}

/// Client-visible failure kinds
#[derive(Debug, Clone)]
pub enum ApiError {
    InvalidRequest(String),
    ValidationError {
        field: String,
        message: String,
    },
    /// The input could not be fetched or decoded as an image
    DecodeError(String),
    /// Every item in a batch failed to decode
    NoValidInput(String),
    /// The underlying model invocation failed
    EncoderError(String),
    ServiceUnavailable(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, message, details) = match self {
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone(), None),
            ApiError::ValidationError { field, message } => {
                let mut details = HashMap::new();
                details.insert(
                    "field".to_string(),
                    serde_json::Value::String(field.clone()),
                );
                ("validation_error", message.clone(), Some(details))
            }
            ApiError::DecodeError(msg) => ("decode_error", msg.clone(), None),
            ApiError::NoValidInput(msg) => ("no_valid_input", msg.clone(), None),
            ApiError::EncoderError(msg) => ("encoder_error", msg.clone(), None),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone(), None),
            ApiError::InternalError(msg) => ("internal_error", msg.clone(), None),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::DecodeError(_) => 400,
            ApiError::NoValidInput(_) => 400,
            ApiError::EncoderError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::DecodeError(msg) => write!(f, "Decode error: {}", msg),
            ApiError::NoValidInput(msg) => write!(f, "No valid input: {}", msg),
            ApiError::EncoderError(msg) => write!(f, "Encoder error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<PipelineError> for ApiError {
    /// Maps pipeline failures onto client-visible outcomes
    ///
    /// Decode failures and exhausted batches are client errors; encoder and
    /// internal failures are server errors. The distinction between
    /// `no_valid_input` and `internal_error` is what lets batch callers tell
    /// "your inputs were all bad" apart from "the service broke".
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Decode(e) => ApiError::DecodeError(e.to_string()),
            PipelineError::EmptyBatch => {
                ApiError::NoValidInput("No valid images to process".to_string())
            }
            PipelineError::Encoder(msg) => ApiError::EncoderError(msg),
            PipelineError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Axum response wrapper for ApiError
pub struct ApiErrorResponse(pub ApiError);

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        ApiErrorResponse(err)
    }
}

impl From<PipelineError> for ApiErrorResponse {
    fn from(err: PipelineError) -> Self {
        ApiErrorResponse(ApiError::from(err))
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error_response = self.0.to_response();

        (status, axum::response::Json(error_response)).into_response()
    }
}
