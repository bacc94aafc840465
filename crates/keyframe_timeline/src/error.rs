// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the timeline boundary.
//!
//! Structural edits on actors never fail with an error: precondition
//! violations are reported as `bool` and lookup misses as `Option`. The
//! errors here only come from the edges of the engine (parsing serialized
//! timelines, choosing a format, validating configuration).

use thiserror::Error;

/// Timeline errors
#[derive(Debug, Error)]
pub enum TimelineError {
    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// RON decoding failed
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON encoding failed
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    /// No format with this name is registered on the timeline
    #[error("Unknown timeline format: {0}")]
    UnknownFormat(String),

    /// Two formats were registered under the same name
    #[error("Timeline format registered twice: {0}")]
    DuplicateFormat(String),

    /// Invalid configuration supplied at construction
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
