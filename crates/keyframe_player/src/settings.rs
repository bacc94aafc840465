// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player settings, stored as RON.
//!
//! ```ron
//! (
//!     log_filter: "keyframe_player=debug",
//!     iterations: Some(3),
//!     max_runtime_ms: None,
//!     timeline: (frame_interval_ms: 33.0),
//! )
//! ```

use crate::error::Result;
use keyframe_timeline::TimelineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Log directives used when neither `RUST_LOG` nor the settings give any
pub const DEFAULT_LOG_FILTER: &str = "keyframe_player=info,keyframe_timeline=info";

/// Settings for one player run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// `tracing` filter directives
    pub log_filter: String,
    /// Loops to play; `None` plays until the runtime limit
    pub iterations: Option<u32>,
    /// Wall-clock limit for the whole run
    pub max_runtime_ms: Option<u64>,
    /// Timeline configuration
    pub timeline: TimelineConfig,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            iterations: Some(1),
            max_runtime_ms: Some(60_000),
            timeline: TimelineConfig::default(),
        }
    }
}

impl PlayerSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Parse settings from RON
    pub fn from_ron(text: &str) -> Result<Self> {
        let settings: PlayerSettings = ron::from_str(text)?;
        settings.timeline.validate()?;
        Ok(settings)
    }

    /// Runtime limit as a duration
    pub fn max_runtime(&self) -> Option<Duration> {
        self.max_runtime_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlayerError;

    #[test]
    fn test_defaults() {
        let settings = PlayerSettings::default();
        assert_eq!(settings.iterations, Some(1));
        assert_eq!(settings.max_runtime(), Some(Duration::from_secs(60)));
        assert!(settings.log_filter.contains("keyframe_timeline"));
    }

    #[test]
    fn test_partial_settings() {
        let settings = PlayerSettings::from_ron(
            "(iterations: None, timeline: (frame_interval_ms: 10.0))",
        )
        .unwrap();
        assert_eq!(settings.iterations, None);
        assert_eq!(settings.timeline.frame_interval_ms, 10.0);
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(settings.max_runtime_ms, Some(60_000));
    }

    #[test]
    fn test_settings_round_trip() {
        let settings = PlayerSettings {
            log_filter: "debug".to_string(),
            iterations: Some(4),
            max_runtime_ms: None,
            timeline: TimelineConfig {
                frame_interval_ms: 20.0,
            },
        };
        let text = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(PlayerSettings::from_ron(&text).unwrap(), settings);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            PlayerSettings::from_ron("(iterations: \"many\")"),
            Err(PlayerError::Settings(_))
        ));
        assert!(matches!(
            PlayerSettings::from_ron("(timeline: (frame_interval_ms: -1.0))"),
            Err(PlayerError::Timeline(_))
        ));
    }
}
