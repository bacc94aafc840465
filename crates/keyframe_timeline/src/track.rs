// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property tracks.
//!
//! A track owns every keyframe property of one named property of an actor,
//! kept sorted by millisecond with at most one property per millisecond.
//! The successor of the property at index `i` is the one at `i + 1`.

use crate::property::{KeyframeProperty, PropertyPatch};
use crate::Millisecond;

/// Ordered sequence of keyframe properties for one property name
#[derive(Debug, Clone, Default)]
pub struct Track {
    properties: Vec<KeyframeProperty>,
}

impl Track {
    /// Insert a property, keeping the track sorted.
    ///
    /// If a property already exists at the same millisecond its value and
    /// easing are overwritten and the incoming property is discarded.
    pub fn insert(&mut self, property: KeyframeProperty) {
        match self.position_at(property.millisecond) {
            Some(index) => {
                let easing = property.easing().to_string();
                self.properties[index].modify(PropertyPatch {
                    millisecond: None,
                    value: Some(property.value),
                    easing: Some(easing),
                });
            }
            None => {
                let index = self
                    .properties
                    .partition_point(|p| p.millisecond < property.millisecond);
                self.properties.insert(index, property);
            }
        }
    }

    /// Re-sort after in-place millisecond edits.
    ///
    /// When two properties end up on the same millisecond, the one at
    /// `keep` (an index from before sorting) survives.
    pub(crate) fn sort(&mut self, keep: Option<usize>) {
        let keep_id = keep.and_then(|i| self.properties.get(i)).map(|p| p.id);
        self.properties.sort_by_key(|p| p.millisecond);

        let mut i = 1;
        while i < self.properties.len() {
            if self.properties[i].millisecond == self.properties[i - 1].millisecond {
                let drop = if Some(self.properties[i - 1].id) == keep_id { i } else { i - 1 };
                self.properties.remove(drop);
            } else {
                i += 1;
            }
        }
    }

    /// Index of the property exactly at `millisecond`
    pub fn position_at(&self, millisecond: Millisecond) -> Option<usize> {
        self.properties
            .binary_search_by_key(&millisecond, |p| p.millisecond)
            .ok()
    }

    /// Property exactly at `millisecond`
    pub fn property_at(&self, millisecond: Millisecond) -> Option<&KeyframeProperty> {
        self.position_at(millisecond).map(|i| &self.properties[i])
    }

    /// Mutable property exactly at `millisecond`
    pub fn property_at_mut(&mut self, millisecond: Millisecond) -> Option<&mut KeyframeProperty> {
        self.position_at(millisecond)
            .map(move |i| &mut self.properties[i])
    }

    /// Index of the property in effect at `millisecond`: the one exactly at
    /// it, else the nearest earlier one
    pub fn latest_at(&self, millisecond: Millisecond) -> Option<usize> {
        self.properties
            .partition_point(|p| p.millisecond <= millisecond)
            .checked_sub(1)
    }

    /// Property at `index`
    pub fn get(&self, index: usize) -> Option<&KeyframeProperty> {
        self.properties.get(index)
    }

    /// Mutable property at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut KeyframeProperty> {
        self.properties.get_mut(index)
    }

    /// Property that follows `index`
    pub fn successor(&self, index: usize) -> Option<&KeyframeProperty> {
        self.properties.get(index + 1)
    }

    /// Remove the property at `millisecond`
    pub fn remove_at(&mut self, millisecond: Millisecond) -> Option<KeyframeProperty> {
        self.position_at(millisecond)
            .map(|i| self.properties.remove(i))
    }

    /// Millisecond of the first property
    pub fn start(&self) -> Option<Millisecond> {
        self.properties.first().map(|p| p.millisecond)
    }

    /// Millisecond of the last property
    pub fn end(&self) -> Option<Millisecond> {
        self.properties.last().map(|p| p.millisecond)
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the track has no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterate over properties in time order
    pub fn iter(&self) -> impl Iterator<Item = &KeyframeProperty> {
        self.properties.iter()
    }

    /// All properties as a slice
    pub fn properties(&self) -> &[KeyframeProperty] {
        &self.properties
    }
}
