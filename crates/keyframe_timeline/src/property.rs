// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe properties: one value of one track at one millisecond.

use crate::actor::ActorId;
use crate::easing::{EasingChain, DEFAULT_EASING};
use crate::export::PropertyData;
use crate::value::PropertyValue;
use crate::Millisecond;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a keyframe property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframePropertyId(pub Uuid);

impl KeyframePropertyId {
    /// Create a new random property ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframePropertyId {
    fn default() -> Self {
        Self::new()
    }
}

/// A single sample on a track.
///
/// The property that follows this one in its track is the one it
/// interpolates towards; see [`crate::track::Track::successor`].
#[derive(Debug, Clone)]
pub struct KeyframeProperty {
    /// Unique property ID
    pub id: KeyframePropertyId,
    /// Actor that owns this property, once inserted
    pub actor: Option<ActorId>,
    /// Position on the timeline
    pub millisecond: Millisecond,
    /// Name of the track this property belongs to
    pub name: String,
    /// Value at this millisecond
    pub value: PropertyValue,
    easing: String,
    curve: EasingChain,
}

impl KeyframeProperty {
    /// Create a new property with linear easing
    pub fn new(millisecond: Millisecond, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            id: KeyframePropertyId::new(),
            actor: None,
            millisecond,
            name: name.into(),
            value: value.into(),
            easing: DEFAULT_EASING.to_string(),
            curve: EasingChain::default(),
        }
    }

    /// Set the easing descriptor
    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.set_easing(easing.into());
        self
    }

    /// Easing descriptor used when interpolating *towards* this property
    pub fn easing(&self) -> &str {
        &self.easing
    }

    /// Parsed easing curves
    pub fn curve(&self) -> &EasingChain {
        &self.curve
    }

    fn set_easing(&mut self, easing: String) {
        self.curve = EasingChain::parse(&easing);
        self.easing = easing;
    }

    /// Apply a partial update. Omitted fields keep their value.
    ///
    /// Changing the millisecond does not re-sort the owning track; the actor
    /// does that after every modification.
    pub fn modify(&mut self, patch: PropertyPatch) {
        if let Some(millisecond) = patch.millisecond {
            self.millisecond = millisecond;
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(easing) = patch.easing {
            self.set_easing(easing);
        }
    }

    /// Linear position of `millisecond` between this property and `next`,
    /// clamped to `[0, 1]`
    pub fn progress_towards(&self, next: &KeyframeProperty, millisecond: Millisecond) -> f64 {
        if next.millisecond <= self.millisecond {
            return 0.0;
        }
        let span = (next.millisecond - self.millisecond) as f64;
        let elapsed = millisecond.saturating_sub(self.millisecond) as f64;
        (elapsed / span).clamp(0.0, 1.0)
    }

    /// Value at `millisecond`.
    ///
    /// With a successor the value is interpolated towards it using the
    /// successor's easing; without one this property's value holds forever.
    pub fn value_at(&self, next: Option<&KeyframeProperty>, millisecond: Millisecond) -> PropertyValue {
        match next {
            Some(next) => {
                let progress = self.progress_towards(next, millisecond);
                self.value.tween(&next.value, progress, &next.curve)
            }
            None => self.value.clone(),
        }
    }

    /// Serializable snapshot of this property
    pub fn export_data(&self) -> PropertyData {
        PropertyData {
            millisecond: self.millisecond,
            name: self.name.clone(),
            value: self.value.clone(),
            easing: self.easing.clone(),
        }
    }
}

/// Partial update for a [`KeyframeProperty`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    /// New millisecond
    pub millisecond: Option<Millisecond>,
    /// New value
    pub value: Option<PropertyValue>,
    /// New easing descriptor
    pub easing: Option<String>,
}

impl PropertyPatch {
    /// Empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to a millisecond
    pub fn millisecond(mut self, millisecond: Millisecond) -> Self {
        self.millisecond = Some(millisecond);
        self
    }

    /// Replace the value
    pub fn value(mut self, value: impl Into<PropertyValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Replace the easing
    pub fn easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = Some(easing.into());
        self
    }
}
