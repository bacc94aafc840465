// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serialized timeline format.
//!
//! ```text
//! { "duration": 1000,
//!   "actors": [ { "start": 0, "end": 1000, "trackNames": ["x"],
//!                 "propertyTracks": { "x": [ { "millisecond": 0, "name": "x",
//!                                              "value": 0, "easing": "linear" } ] } } ] }
//! ```
//!
//! The data structs are format agnostic. A [`TimelineFormat`] turns them into
//! text; JSON and RON are built in and more can be registered on a timeline.

use crate::error::Result;
use crate::value::PropertyValue;
use crate::Millisecond;
use indexmap::IndexMap;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};

/// Exported timeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineData {
    /// Total animation length
    pub duration: Millisecond,
    /// Exported actors, in timeline order
    pub actors: Vec<ActorData>,
}

/// Exported actor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorData {
    /// First keyframe millisecond
    pub start: Millisecond,
    /// Last keyframe millisecond
    pub end: Millisecond,
    /// Track names in track order
    pub track_names: Vec<String>,
    /// Properties of every track, sorted by millisecond
    pub property_tracks: IndexMap<String, Vec<PropertyData>>,
}

/// Exported keyframe property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyData {
    /// Position on the timeline
    pub millisecond: Millisecond,
    /// Track name
    pub name: String,
    /// Value
    pub value: PropertyValue,
    /// Easing descriptor
    pub easing: String,
}

/// Text encoding of [`TimelineData`]
pub trait TimelineFormat {
    /// Name the format is registered under
    fn name(&self) -> &str;

    /// Encode a timeline
    fn encode(&self, data: &TimelineData) -> Result<String>;

    /// Decode a timeline
    fn decode(&self, text: &str) -> Result<TimelineData>;
}

/// Pretty-printed JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl TimelineFormat for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn encode(&self, data: &TimelineData) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    fn decode(&self, text: &str) -> Result<TimelineData> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Pretty-printed RON
#[derive(Debug, Clone, Copy, Default)]
pub struct RonFormat;

impl TimelineFormat for RonFormat {
    fn name(&self) -> &str {
        "ron"
    }

    fn encode(&self, data: &TimelineData) -> Result<String> {
        Ok(ron::ser::to_string_pretty(data, PrettyConfig::default())?)
    }

    fn decode(&self, text: &str) -> Result<TimelineData> {
        Ok(ron::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimelineError;

    fn sample() -> TimelineData {
        let mut property_tracks = IndexMap::new();
        property_tracks.insert(
            "x".to_string(),
            vec![
                PropertyData {
                    millisecond: 0,
                    name: "x".to_string(),
                    value: PropertyValue::from(0),
                    easing: "linear".to_string(),
                },
                PropertyData {
                    millisecond: 1000,
                    name: "x".to_string(),
                    value: PropertyValue::from(100),
                    easing: "easeOutQuad".to_string(),
                },
            ],
        );
        property_tracks.insert(
            "color".to_string(),
            vec![PropertyData {
                millisecond: 500,
                name: "color".to_string(),
                value: PropertyValue::from("#f00"),
                easing: "linear".to_string(),
            }],
        );

        TimelineData {
            duration: 1000,
            actors: vec![ActorData {
                start: 0,
                end: 1000,
                track_names: vec!["x".to_string(), "color".to_string()],
                property_tracks,
            }],
        }
    }

    #[test]
    fn test_json_field_names() {
        let json = JsonFormat.encode(&sample()).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(raw["duration"], 1000);
        let actor = &raw["actors"][0];
        assert_eq!(actor["trackNames"][1], "color");
        assert_eq!(actor["propertyTracks"]["x"][1]["easing"], "easeOutQuad");
        assert_eq!(actor["propertyTracks"]["color"][0]["value"], "#f00");
    }

    #[test]
    fn test_json_round_trip() {
        let data = sample();
        let decoded = JsonFormat.decode(&JsonFormat.encode(&data).unwrap()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_ron_round_trip() {
        let data = sample();
        let text = RonFormat.encode(&data).unwrap();
        assert!(text.contains("propertyTracks"));
        let decoded = RonFormat.decode(&text).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(JsonFormat.decode("{"), Err(TimelineError::Json(_))));
        assert!(matches!(RonFormat.decode("(duration:"), Err(TimelineError::RonParse(_))));
    }
}
