// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player errors.

use keyframe_timeline::TimelineError;
use thiserror::Error;

/// Errors that end a player run
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Bad command line
    #[error("{0}")]
    Usage(String),

    /// Reading a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid RON
    #[error("Settings parse error: {0}")]
    Settings(#[from] ron::error::SpannedError),

    /// The timeline could not be built or loaded
    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;
