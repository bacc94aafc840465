// SPDX-License-Identifier: MIT OR Apache-2.0
//! Actors: named property tracks and the state computed from them.
//!
//! ## Segment cache
//!
//! Every millisecond at which any track has a keyframe starts a segment.
//! For each segment the actor records, per track, the index of the property
//! in effect at its start: the property exactly there, else the nearest
//! earlier one. A track that has not started yet is absent from the
//! segment. This is how one track's keyframe "inherits" the running values
//! of all other tracks without copying them.
//!
//! The cache is rebuilt wholesale after every structural change.

use crate::easing::DEFAULT_EASING;
use crate::export::ActorData;
use crate::property::{KeyframeProperty, PropertyPatch};
use crate::render::{ActorRenderer, RenderTarget};
use crate::timeline::TimelineId;
use crate::track::Track;
use crate::value::PropertyValue;
use crate::Millisecond;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Create a new random actor ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat track name → value mapping computed for one millisecond
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorState(IndexMap<String, PropertyValue>);

impl ActorState {
    /// Value of a track
    pub fn get(&self, track: &str) -> Option<&PropertyValue> {
        self.0.get(track)
    }

    /// Numeric value of a track
    pub fn number(&self, track: &str) -> Option<f64> {
        self.get(track).and_then(PropertyValue::as_number)
    }

    /// Set the value of a track
    pub fn insert(&mut self, track: impl Into<String>, value: PropertyValue) {
        self.0.insert(track.into(), value);
    }

    /// Iterate over track values in track order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of tracks in the state
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no track has a value
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Easing given to [`Actor::keyframe_with_easing`]
#[derive(Debug, Clone, PartialEq)]
pub enum KeyframeEasing {
    /// Same descriptor for every property of the keyframe
    Uniform(String),
    /// Descriptor per track; tracks not listed are linear
    PerTrack(HashMap<String, String>),
}

impl KeyframeEasing {
    /// Descriptor for one track
    pub fn for_track(&self, track: &str) -> &str {
        match self {
            KeyframeEasing::Uniform(easing) => easing,
            KeyframeEasing::PerTrack(map) => map.get(track).map_or(DEFAULT_EASING, String::as_str),
        }
    }
}

impl Default for KeyframeEasing {
    fn default() -> Self {
        KeyframeEasing::Uniform(DEFAULT_EASING.to_string())
    }
}

impl From<&str> for KeyframeEasing {
    fn from(easing: &str) -> Self {
        KeyframeEasing::Uniform(easing.to_string())
    }
}

impl From<String> for KeyframeEasing {
    fn from(easing: String) -> Self {
        KeyframeEasing::Uniform(easing)
    }
}

impl From<HashMap<String, String>> for KeyframeEasing {
    fn from(map: HashMap<String, String>) -> Self {
        KeyframeEasing::PerTrack(map)
    }
}

/// Segment start → (track name → index of the property in effect)
type Segment = IndexMap<String, usize>;

/// An animated object
pub struct Actor {
    id: ActorId,
    tracks: IndexMap<String, Track>,
    cache: HashMap<Millisecond, Segment>,
    cache_index: Vec<Millisecond>,
    state: ActorState,
    /// Arbitrary user data
    pub data: HashMap<String, serde_json::Value>,
    context: Option<RenderTarget>,
    renderer: Option<Box<dyn ActorRenderer>>,
    timeline: Option<TimelineId>,
    modifications: usize,
}

impl Actor {
    /// Create an actor with no keyframes
    pub fn new() -> Self {
        Self::with_id(ActorId::new())
    }

    /// Create an actor with a known ID
    pub fn with_id(id: ActorId) -> Self {
        Self {
            id,
            tracks: IndexMap::new(),
            cache: HashMap::new(),
            cache_index: Vec::new(),
            state: ActorState::default(),
            data: HashMap::new(),
            context: None,
            renderer: None,
            timeline: None,
            modifications: 0,
        }
    }

    /// Builder-style renderer assignment
    pub fn with_renderer(mut self, renderer: Box<dyn ActorRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Actor ID
    pub fn id(&self) -> ActorId {
        self.id
    }

    // Keyframes

    /// Add a keyframe with linear easing on every property.
    ///
    /// A property on a track that already has one at `millisecond` is
    /// overwritten.
    pub fn keyframe<K, V>(
        &mut self,
        millisecond: Millisecond,
        properties: impl IntoIterator<Item = (K, V)>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.keyframe_with_easing(millisecond, properties, KeyframeEasing::default())
    }

    /// Add a keyframe with an easing for all properties or per track
    pub fn keyframe_with_easing<K, V>(
        &mut self,
        millisecond: Millisecond,
        properties: impl IntoIterator<Item = (K, V)>,
        easing: impl Into<KeyframeEasing>,
    ) -> &mut Self
    where
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        let easing = easing.into();
        for (name, value) in properties {
            let name = name.into();
            let mut property = KeyframeProperty::new(millisecond, name.clone(), value)
                .with_easing(easing.for_track(&name));
            property.actor = Some(self.id);
            self.tracks.entry(name).or_default().insert(property);
        }
        self.rebuild();
        self
    }

    /// Property at `index` of a track
    pub fn get_keyframe_property(&self, track: &str, index: usize) -> Option<&KeyframeProperty> {
        self.tracks.get(track).and_then(|t| t.get(index))
    }

    /// Patch the property at `index` of a track. Moving it onto an occupied
    /// millisecond replaces the occupant. Returns whether the property exists.
    pub fn modify_keyframe_property(&mut self, track: &str, index: usize, patch: PropertyPatch) -> bool {
        let Some(track) = self.tracks.get_mut(track) else {
            return false;
        };
        let Some(property) = track.get_mut(index) else {
            return false;
        };
        property.modify(patch);
        track.sort(Some(index));
        self.rebuild();
        true
    }

    /// Track names in insertion order
    pub fn track_names(&self) -> Vec<&str> {
        self.tracks.keys().map(String::as_str).collect()
    }

    /// Number of properties on a track
    pub fn track_length(&self, track: &str) -> Option<usize> {
        self.tracks.get(track).map(Track::len)
    }

    /// Track by name
    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.get(name)
    }

    /// Copy every property found exactly at `from` to `to`
    pub fn copy_properties(&mut self, to: Millisecond, from: Millisecond) -> &mut Self {
        let copies: Vec<KeyframeProperty> = self
            .tracks
            .values()
            .filter_map(|track| track.property_at(from))
            .map(|p| {
                let mut copy = KeyframeProperty::new(to, p.name.clone(), p.value.clone()).with_easing(p.easing());
                copy.actor = Some(self.id);
                copy
            })
            .collect();
        if copies.is_empty() {
            return self;
        }

        for copy in copies {
            if let Some(track) = self.tracks.get_mut(&copy.name) {
                track.insert(copy);
            }
        }
        self.rebuild();
        self
    }

    /// Hold the state at the current end until `until`
    pub fn wait(&mut self, until: Millisecond) -> &mut Self {
        let end = self.end(None);
        if until <= end {
            return self;
        }

        let mut values = Vec::new();
        let mut easings = HashMap::new();
        for (name, track) in &self.tracks {
            if let Some(property) = track.latest_at(end).and_then(|i| track.get(i)) {
                values.push((name.clone(), property.value.clone()));
                easings.insert(name.clone(), property.easing().to_string());
            }
        }

        self.remove_keyframe(end);
        let easing = KeyframeEasing::PerTrack(easings);
        self.keyframe_with_easing(end, values.clone(), easing.clone());
        self.keyframe_with_easing(until, values, easing);
        self
    }

    /// First keyframe millisecond of a track, or of all tracks. 0 when empty.
    pub fn start(&self, track: Option<&str>) -> Millisecond {
        match track {
            Some(name) => self.tracks.get(name).and_then(Track::start).unwrap_or(0),
            None => self.tracks.values().filter_map(Track::start).min().unwrap_or(0),
        }
    }

    /// Last keyframe millisecond of a track, or of all tracks. 0 when empty.
    pub fn end(&self, track: Option<&str>) -> Millisecond {
        match track {
            Some(name) => self.tracks.get(name).and_then(Track::end).unwrap_or(0),
            None => self.tracks.values().filter_map(Track::end).max().unwrap_or(0),
        }
    }

    /// Distance between start and end
    pub fn length(&self, track: Option<&str>) -> Millisecond {
        self.end(track).saturating_sub(self.start(track))
    }

    /// Whether a keyframe exists exactly at `millisecond`
    pub fn has_keyframe_at(&self, millisecond: Millisecond, track: Option<&str>) -> bool {
        match track {
            Some(name) => self
                .tracks
                .get(name)
                .is_some_and(|t| t.position_at(millisecond).is_some()),
            None => self
                .tracks
                .values()
                .any(|t| t.position_at(millisecond).is_some()),
        }
    }

    /// Move every property at `from` to `to`.
    ///
    /// Fails without changing anything when there is nothing at `from` or
    /// something already at `to`.
    pub fn move_keyframe(&mut self, from: Millisecond, to: Millisecond) -> bool {
        if !self.has_keyframe_at(from, None) || self.has_keyframe_at(to, None) {
            tracing::debug!(actor = %self.id, from, to, "Keyframe move rejected");
            return false;
        }

        for track in self.tracks.values_mut() {
            if let Some(property) = track.property_at_mut(from) {
                property.millisecond = to;
            }
        }
        self.rebuild();
        true
    }

    /// Patch values and easings of the properties at `millisecond`.
    /// Tracks without a property there are left alone. Does nothing when no
    /// property was patched.
    pub fn modify_keyframe(
        &mut self,
        millisecond: Millisecond,
        values: HashMap<String, PropertyValue>,
        easings: HashMap<String, String>,
    ) -> &mut Self {
        let mut patched = false;
        for (name, track) in self.tracks.iter_mut() {
            let patch = PropertyPatch {
                millisecond: None,
                value: values.get(name).cloned(),
                easing: easings.get(name).cloned(),
            };
            if patch == PropertyPatch::default() {
                continue;
            }
            if let Some(property) = track.property_at_mut(millisecond) {
                property.modify(patch);
                patched = true;
            }
        }
        if patched {
            self.rebuild();
        }
        self
    }

    /// Remove the properties at `millisecond` from every track. Does nothing
    /// when no track has a property there.
    pub fn remove_keyframe(&mut self, millisecond: Millisecond) -> &mut Self {
        let mut removed = false;
        for track in self.tracks.values_mut() {
            removed |= track.remove_at(millisecond).is_some();
        }
        if removed {
            self.rebuild();
        }
        self
    }

    /// Remove every track and property
    pub fn remove_all_keyframe_properties(&mut self) -> &mut Self {
        self.tracks.clear();
        self.rebuild();
        self
    }

    /// Total number of properties across tracks
    pub fn property_count(&self) -> usize {
        self.tracks.values().map(Track::len).sum()
    }

    /// Every property, track by track
    pub fn properties(&self) -> impl Iterator<Item = &KeyframeProperty> {
        self.tracks.values().flat_map(Track::iter)
    }

    fn rebuild(&mut self) {
        for track in self.tracks.values_mut() {
            track.sort(None);
        }
        self.tracks.retain(|_, track| !track.is_empty());

        let mut index: Vec<Millisecond> = self
            .tracks
            .values()
            .flat_map(|t| t.iter().map(|p| p.millisecond))
            .collect();
        index.sort_unstable();
        index.dedup();

        self.cache = index
            .iter()
            .map(|&millisecond| {
                let segment: Segment = self
                    .tracks
                    .iter()
                    .filter_map(|(name, track)| track.latest_at(millisecond).map(|i| (name.clone(), i)))
                    .collect();
                (millisecond, segment)
            })
            .collect();
        self.cache_index = index;
        self.modifications += 1;

        tracing::trace!(
            actor = %self.id,
            tracks = self.tracks.len(),
            segments = self.cache_index.len(),
            "Rebuilt segment cache"
        );
    }

    // State

    /// Interpolated state at `millisecond`.
    ///
    /// Milliseconds past the end are clamped to the end. Returns `None`
    /// before the first keyframe; an actor without keyframes has an empty
    /// state.
    pub fn compute_state_at(&self, millisecond: Millisecond) -> Option<ActorState> {
        let Some(&first) = self.cache_index.first() else {
            return Some(ActorState::default());
        };
        let millisecond = millisecond.min(self.end(None));
        if millisecond < first {
            return None;
        }

        let slot = self
            .cache_index
            .partition_point(|&m| m <= millisecond)
            .checked_sub(1)?;
        let segment = self.cache.get(&self.cache_index[slot])?;

        let mut state = ActorState::default();
        for (name, &index) in segment {
            let Some(track) = self.tracks.get(name) else {
                continue;
            };
            let Some(from) = track.get(index) else {
                continue;
            };

            let mut value = match track.successor(index) {
                Some(next) => {
                    let mut start = from.value.clone();
                    let mut end = next.value.clone();
                    if let Some(renderer) = &self.renderer {
                        renderer.before_interpolate(name, &mut start, &mut end);
                    }
                    start.tween(&end, from.progress_towards(next, millisecond), next.curve())
                }
                None => from.value.clone(),
            };
            if let Some(renderer) = &self.renderer {
                renderer.after_interpolate(name, &mut value);
            }
            state.insert(name.clone(), value);
        }

        Some(state)
    }

    /// Compute and store the state at `millisecond`. Before the first
    /// keyframe the previous state is kept.
    pub fn update_state(&mut self, millisecond: Millisecond) {
        if let Some(state) = self.compute_state_at(millisecond) {
            self.state = state;
        }
    }

    /// Last stored state
    pub fn state(&self) -> &ActorState {
        &self.state
    }

    /// Hand the stored state to the renderer
    pub fn render(&mut self) {
        if let Some(renderer) = &mut self.renderer {
            renderer.render(self.context.as_ref(), &self.state);
        }
    }

    /// Stop renderer-side effects still in flight
    pub fn stop(&mut self) {
        if let Some(renderer) = &mut self.renderer {
            renderer.stop();
        }
    }

    // Rendering

    /// Render target
    pub fn context(&self) -> Option<&RenderTarget> {
        self.context.as_ref()
    }

    /// Replace the render target
    pub fn set_context(&mut self, context: Option<RenderTarget>) {
        self.context = context;
    }

    /// Whether a renderer is attached
    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Replace the renderer
    pub fn set_renderer(&mut self, renderer: Box<dyn ActorRenderer>) {
        self.renderer = Some(renderer);
    }

    // Timeline attachment

    /// Timeline this actor belongs to
    pub fn timeline(&self) -> Option<TimelineId> {
        self.timeline
    }

    /// Whether the actor belongs to a timeline
    pub fn is_attached(&self) -> bool {
        self.timeline.is_some()
    }

    pub(crate) fn attach(&mut self, timeline: TimelineId) {
        self.timeline = Some(timeline);
        self.modifications = 0;
        if let Some(renderer) = &mut self.renderer {
            renderer.setup(self.id, self.context.as_ref());
        }
    }

    pub(crate) fn detach(&mut self) {
        self.timeline = None;
        if let Some(renderer) = &mut self.renderer {
            renderer.teardown(self.id, self.context.as_ref());
        }
    }

    /// Cache rebuilds since the last call
    pub(crate) fn take_modifications(&mut self) -> usize {
        std::mem::take(&mut self.modifications)
    }

    // Export

    /// Serializable snapshot of every track
    pub fn export_timeline(&self) -> ActorData {
        ActorData {
            start: self.start(None),
            end: self.end(None),
            track_names: self.tracks.keys().cloned().collect(),
            property_tracks: self
                .tracks
                .iter()
                .map(|(name, track)| (name.clone(), track.iter().map(KeyframeProperty::export_data).collect()))
                .collect(),
        }
    }

    /// Re-create exported properties on this actor, track by track
    pub fn import_timeline(&mut self, data: &ActorData) -> &mut Self {
        for properties in data.property_tracks.values() {
            for property in properties {
                self.keyframe_with_easing(
                    property.millisecond,
                    [(property.name.clone(), property.value.clone())],
                    property.easing.clone(),
                );
            }
        }
        self
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("tracks", &self.tracks)
            .field("state", &self.state)
            .field("timeline", &self.timeline)
            .field("has_renderer", &self.renderer.is_some())
            .finish_non_exhaustive()
    }
}
