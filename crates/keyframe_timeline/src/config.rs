// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline configuration.

use crate::error::{Result, TimelineError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default frame interval, one display refresh at 60 Hz
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

/// Settings for a [`crate::Timeline`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Interval requested from the scheduler between frames, in milliseconds
    pub frame_interval_ms: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl TimelineConfig {
    /// Parse from RON. Missing fields take their defaults.
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values are usable
    pub fn validate(&self) -> Result<()> {
        if !self.frame_interval_ms.is_finite() || self.frame_interval_ms <= 0.0 {
            return Err(TimelineError::Config(format!(
                "frame interval must be a positive number of milliseconds, got {}",
                self.frame_interval_ms
            )));
        }
        Ok(())
    }

    /// Frame interval as a duration
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(self.frame_interval_ms.max(0.0) / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval() {
        let config = TimelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_interval().as_micros(), 16_666);
    }

    #[test]
    fn test_from_ron() {
        let config = TimelineConfig::from_ron("(frame_interval_ms: 40.0)").unwrap();
        assert_eq!(config.frame_interval_ms, 40.0);
        assert_eq!(config.frame_interval().as_micros(), 40_000);

        let defaulted = TimelineConfig::from_ron("()").unwrap();
        assert_eq!(defaulted, TimelineConfig::default());
    }

    #[test]
    fn test_rejects_bad_interval() {
        assert!(matches!(
            TimelineConfig::from_ron("(frame_interval_ms: 0.0)"),
            Err(TimelineError::Config(_))
        ));
        let config = TimelineConfig {
            frame_interval_ms: f64::NAN,
        };
        assert!(config.validate().is_err());
    }
}
