// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline events.
//!
//! Handlers are registered per [`EventKind`] and run synchronously, in
//! registration order, every time the timeline emits an event of that kind.

use crate::actor::ActorId;
use crate::timeline::PlayState;
use crate::Millisecond;
use std::collections::HashMap;

/// Kinds of events a timeline emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// An actor was added
    AddActor,
    /// An actor was removed
    RemoveActor,
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Playback stopped
    Stop,
    /// Any of play, pause or stop
    PlayStateChange,
    /// Before actors are updated
    BeforeUpdate,
    /// After actors are updated
    AfterUpdate,
    /// An iteration-bounded animation finished
    AnimationComplete,
    /// Keyframes of an actor were added, changed or removed
    TimelineModified,
}

impl EventKind {
    /// Every event kind
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::AddActor,
            EventKind::RemoveActor,
            EventKind::Play,
            EventKind::Pause,
            EventKind::Stop,
            EventKind::PlayStateChange,
            EventKind::BeforeUpdate,
            EventKind::AfterUpdate,
            EventKind::AnimationComplete,
            EventKind::TimelineModified,
        ]
    }
}

/// An event with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// An actor was added
    AddActor(ActorId),
    /// An actor was removed
    RemoveActor(ActorId),
    /// Playback started or resumed
    Play,
    /// Playback paused
    Pause,
    /// Playback stopped
    Stop,
    /// The play state changed to the given state
    PlayStateChange(PlayState),
    /// About to update actors to a millisecond
    BeforeUpdate(Millisecond),
    /// Finished updating actors to a millisecond
    AfterUpdate(Millisecond),
    /// An iteration-bounded animation finished
    AnimationComplete,
    /// Keyframes of an actor changed
    TimelineModified(ActorId),
}

impl TimelineEvent {
    /// The kind of this event
    pub fn kind(&self) -> EventKind {
        match self {
            TimelineEvent::AddActor(_) => EventKind::AddActor,
            TimelineEvent::RemoveActor(_) => EventKind::RemoveActor,
            TimelineEvent::Play => EventKind::Play,
            TimelineEvent::Pause => EventKind::Pause,
            TimelineEvent::Stop => EventKind::Stop,
            TimelineEvent::PlayStateChange(_) => EventKind::PlayStateChange,
            TimelineEvent::BeforeUpdate(_) => EventKind::BeforeUpdate,
            TimelineEvent::AfterUpdate(_) => EventKind::AfterUpdate,
            TimelineEvent::AnimationComplete => EventKind::AnimationComplete,
            TimelineEvent::TimelineModified(_) => EventKind::TimelineModified,
        }
    }
}

/// Handle returned by [`EventBus::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Event handler
pub type EventHandler = Box<dyn FnMut(&TimelineEvent)>;

/// Ordered handler lists per event kind
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<(HandlerId, EventHandler)>>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to an event kind
    pub fn on(&mut self, kind: EventKind, handler: impl FnMut(&TimelineEvent) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Unsubscribe one handler. Returns whether it was registered.
    pub fn off(&mut self, kind: EventKind, id: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(handler_id, _)| *handler_id != id);
        list.len() != before
    }

    /// Unsubscribe every handler of a kind. Returns how many were removed.
    pub fn off_all(&mut self, kind: EventKind) -> usize {
        self.handlers.remove(&kind).map_or(0, |list| list.len())
    }

    /// Number of handlers registered for a kind
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Run every handler registered for the event's kind
    pub fn emit(&mut self, event: &TimelineEvent) {
        if let Some(list) = self.handlers.get_mut(&event.kind()) {
            for (_, handler) in list.iter_mut() {
                handler(event);
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .handlers
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}
