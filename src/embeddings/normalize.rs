// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! L2 normalization of feature vectors
//!
//! Every vector the service emits is rescaled to unit Euclidean length so
//! that cosine similarity reduces to a dot product downstream.

/// Euclidean norm of a vector
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Rescale a vector to unit Euclidean length in place
///
/// The all-zero vector is left unchanged: dividing by a zero norm would
/// produce NaN, and a degenerate encoder output must not poison the
/// response.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for value in v.iter_mut() {
            *value /= norm;
        }
    }
}
