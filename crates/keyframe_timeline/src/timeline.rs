// SPDX-License-Identifier: MIT OR Apache-2.0
//! The timeline coordinator.
//!
//! A [`Timeline`] owns actors, tracks the total animation length, and runs
//! the play/pause/stop state machine. It never spins its own loop: while
//! playing it keeps exactly one frame requested from its [`Scheduler`] and
//! the host calls [`Timeline::tick`] when that frame is due.

use crate::actor::{Actor, ActorId};
use crate::config::TimelineConfig;
use crate::error::{Result, TimelineError};
use crate::event::{EventBus, EventKind, HandlerId, TimelineEvent};
use crate::export::{JsonFormat, RonFormat, TimelineData, TimelineFormat};
use crate::render::{ActorRenderer, RenderTarget, RendererFactory};
use crate::scheduler::{Clock, FrameHandle, ManualScheduler, Scheduler, SystemClock};
use crate::Millisecond;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    /// Create a new random timeline ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayState {
    /// Not playing; a new `play` starts from the beginning
    #[default]
    Stopped,
    /// Not playing; a new `play` resumes where playback paused
    Paused,
    /// Advancing on every frame
    Playing,
}

/// Coordinates actors on a shared clock
pub struct Timeline {
    id: TimelineId,
    actors: IndexMap<ActorId, Actor>,
    animation_length: Millisecond,
    play_state: PlayState,
    iterations: Option<u32>,
    /// Clock time at which the current loop started. Signed so that
    /// `play_from` can place it before the clock's zero.
    loop_origin: i64,
    paused_at: Millisecond,
    last_updated: Millisecond,
    events: EventBus,
    scheduler: Box<dyn Scheduler>,
    clock: Box<dyn Clock>,
    frame: Option<FrameHandle>,
    config: TimelineConfig,
    formats: IndexMap<String, Box<dyn TimelineFormat>>,
    renderer_factory: Option<RendererFactory>,
    context: Option<RenderTarget>,
}

impl Timeline {
    /// Create a timeline with a manual scheduler, the system clock and the
    /// built-in formats
    pub fn new() -> Self {
        TimelineBuilder::new().assemble()
    }

    /// Start configuring a timeline
    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::new()
    }

    /// Timeline ID
    pub fn id(&self) -> TimelineId {
        self.id
    }

    /// Configuration in use
    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    // Actors

    /// Add an actor.
    ///
    /// An actor without a render target gets the timeline's, and one without
    /// a renderer gets one from the timeline's renderer factory. Adding an
    /// actor whose ID is already present does nothing.
    pub fn add_actor(&mut self, mut actor: Actor) -> ActorId {
        let id = actor.id();
        if self.actors.contains_key(&id) {
            return id;
        }

        if actor.context().is_none() {
            actor.set_context(self.context.clone());
        }
        if !actor.has_renderer() {
            if let Some(factory) = &self.renderer_factory {
                actor.set_renderer(factory());
            }
        }

        actor.attach(self.id);
        self.actors.insert(id, actor);
        self.recalculate_animation_length();

        tracing::debug!(actor = %id, length = self.animation_length, "Actor added");
        self.events.emit(&TimelineEvent::AddActor(id));
        id
    }

    /// Remove an actor and hand it back
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let mut actor = self.actors.shift_remove(&id)?;
        actor.detach();
        self.recalculate_animation_length();

        tracing::debug!(actor = %id, length = self.animation_length, "Actor removed");
        self.events.emit(&TimelineEvent::RemoveActor(id));
        Some(actor)
    }

    /// Actor by ID
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Edit an attached actor.
    ///
    /// After the closure returns, one `TimelineModified` event fires per
    /// keyframe change it made and the animation length is recomputed.
    pub fn edit_actor<R>(&mut self, id: ActorId, edit: impl FnOnce(&mut Actor) -> R) -> Option<R> {
        let actor = self.actors.get_mut(&id)?;
        let result = edit(actor);
        let modifications = actor.take_modifications();

        if modifications > 0 {
            self.recalculate_animation_length();
            for _ in 0..modifications {
                self.events.emit(&TimelineEvent::TimelineModified(id));
            }
        }
        Some(result)
    }

    /// IDs of all actors in insertion order
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    /// All actors in insertion order
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Number of actors
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Latest end among all actors, 0 without actors
    pub fn animation_length(&self) -> Millisecond {
        self.animation_length
    }

    fn recalculate_animation_length(&mut self) {
        self.animation_length = self
            .actors
            .values()
            .map(|actor| actor.end(None))
            .max()
            .unwrap_or(0);
    }

    // Playback

    /// Start or resume playback. `None` or `Some(0)` loops forever.
    pub fn play(&mut self, iterations: Option<u32>) {
        self.cancel_frame();

        let now = self.clock.now();
        if self.play_state == PlayState::Paused {
            self.loop_origin += clock_offset(now.saturating_sub(self.paused_at));
        } else {
            self.loop_origin = clock_offset(now);
        }

        self.iterations = iterations.filter(|&n| n > 0);
        self.play_state = PlayState::Playing;
        self.schedule_frame();

        tracing::debug!(iterations = ?self.iterations, "Timeline playing");
        self.events.emit(&TimelineEvent::PlayStateChange(PlayState::Playing));
        self.events.emit(&TimelineEvent::Play);
    }

    /// Start playback as if it had begun `millisecond` ago
    pub fn play_from(&mut self, millisecond: Millisecond, iterations: Option<u32>) {
        self.play(iterations);
        self.loop_origin = clock_offset(self.clock.now()).saturating_sub(clock_offset(millisecond));
    }

    /// Start playback from the last updated millisecond
    pub fn play_from_current(&mut self, iterations: Option<u32>) {
        self.play_from(self.last_updated, iterations);
    }

    /// Pause playback. Does nothing unless playing.
    pub fn pause(&mut self) {
        if self.play_state != PlayState::Playing {
            return;
        }

        self.play_state = PlayState::Paused;
        self.cancel_frame();
        self.paused_at = self.clock.now();

        tracing::debug!(at = self.paused_at, "Timeline paused");
        self.events.emit(&TimelineEvent::PlayStateChange(PlayState::Paused));
        self.events.emit(&TimelineEvent::Pause);
    }

    /// Stop playback and every actor's in-flight effects
    pub fn stop(&mut self) {
        self.play_state = PlayState::Stopped;
        self.cancel_frame();
        for actor in self.actors.values_mut() {
            actor.stop();
        }

        tracing::debug!("Timeline stopped");
        self.events.emit(&TimelineEvent::PlayStateChange(PlayState::Stopped));
        self.events.emit(&TimelineEvent::Stop);
    }

    /// Whether the timeline is playing
    pub fn is_playing(&self) -> bool {
        self.play_state == PlayState::Playing
    }

    /// Current playback state
    pub fn play_state(&self) -> PlayState {
        self.play_state
    }

    /// Frame currently requested from the scheduler
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    /// Advance to the clock's current time. Called by the host when the
    /// requested frame is due; does nothing unless playing.
    pub fn tick(&mut self) {
        if let Some(handle) = self.frame.take() {
            self.scheduler.complete(handle);
        }
        if self.play_state != PlayState::Playing {
            return;
        }
        self.schedule_frame();

        let now = clock_offset(self.clock.now());
        let elapsed = u64::try_from(now.saturating_sub(self.loop_origin)).unwrap_or(0);
        let length = self.animation_length;

        let (iteration, position) = if length == 0 {
            (0, 0)
        } else {
            (elapsed / length, elapsed % length)
        };
        let complete = self
            .iterations
            .is_some_and(|target| iteration >= u64::from(target));
        let position = if complete { length } else { position };

        self.update(Some(position));

        if complete {
            self.stop();
            tracing::debug!(iterations = ?self.iterations, "Animation complete");
            self.events.emit(&TimelineEvent::AnimationComplete);
        }
    }

    /// Compute and render every actor at `millisecond`, or again at the last
    /// updated millisecond. Does not change the play state.
    pub fn update(&mut self, millisecond: Option<Millisecond>) {
        let millisecond = millisecond.unwrap_or(self.last_updated);

        self.events.emit(&TimelineEvent::BeforeUpdate(millisecond));
        for actor in self.actors.values_mut() {
            actor.update_state(millisecond);
            actor.render();
        }
        self.last_updated = millisecond;
        self.events.emit(&TimelineEvent::AfterUpdate(millisecond));
    }

    /// Millisecond passed to the last update
    pub fn last_updated_millisecond(&self) -> Millisecond {
        self.last_updated
    }

    /// Last updated millisecond as a fraction of the animation length
    pub fn last_position_updated(&self) -> f64 {
        if self.animation_length == 0 {
            return 0.0;
        }
        self.last_updated as f64 / self.animation_length as f64
    }

    fn schedule_frame(&mut self) {
        self.frame = Some(self.scheduler.schedule(self.config.frame_interval()));
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.frame.take() {
            self.scheduler.cancel(handle);
        }
    }

    // Events

    /// Subscribe to an event kind
    pub fn on(&mut self, kind: EventKind, handler: impl FnMut(&TimelineEvent) + 'static) -> HandlerId {
        self.events.on(kind, handler)
    }

    /// Unsubscribe one handler
    pub fn off(&mut self, kind: EventKind, handler: HandlerId) -> bool {
        self.events.off(kind, handler)
    }

    /// Unsubscribe every handler of a kind
    pub fn off_all(&mut self, kind: EventKind) -> usize {
        self.events.off_all(kind)
    }

    // Export

    /// Serializable snapshot of all actors
    pub fn export_timeline(&self) -> TimelineData {
        TimelineData {
            duration: self.animation_length,
            actors: self.actors.values().map(Actor::export_timeline).collect(),
        }
    }

    /// Create one actor per exported actor. Returns the new actor IDs.
    pub fn import_timeline(&mut self, data: &TimelineData) -> Vec<ActorId> {
        data.actors
            .iter()
            .map(|actor_data| {
                let mut actor = Actor::new();
                actor.import_timeline(actor_data);
                self.add_actor(actor)
            })
            .collect()
    }

    /// Export as text in a registered format
    pub fn export_as(&self, format: &str) -> Result<String> {
        self.format(format)?.encode(&self.export_timeline())
    }

    /// Import text in a registered format
    pub fn import_from(&mut self, format: &str, text: &str) -> Result<Vec<ActorId>> {
        let data = self.format(format)?.decode(text)?;
        Ok(self.import_timeline(&data))
    }

    /// Names of registered formats
    pub fn format_names(&self) -> Vec<&str> {
        self.formats.keys().map(String::as_str).collect()
    }

    fn format(&self, name: &str) -> Result<&dyn TimelineFormat> {
        self.formats
            .get(name)
            .map(|format| &**format)
            .ok_or_else(|| TimelineError::UnknownFormat(name.to_string()))
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("id", &self.id)
            .field("actors", &self.actors.len())
            .field("animation_length", &self.animation_length)
            .field("play_state", &self.play_state)
            .field("last_updated", &self.last_updated)
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn clock_offset(millisecond: Millisecond) -> i64 {
    i64::try_from(millisecond).unwrap_or(i64::MAX)
}

/// Builder for [`Timeline`]
pub struct TimelineBuilder {
    config: TimelineConfig,
    context: Option<RenderTarget>,
    scheduler: Option<Box<dyn Scheduler>>,
    clock: Option<Box<dyn Clock>>,
    formats: Vec<Box<dyn TimelineFormat>>,
    renderer_factory: Option<RendererFactory>,
}

impl TimelineBuilder {
    /// Start from defaults
    pub fn new() -> Self {
        Self {
            config: TimelineConfig::default(),
            context: None,
            scheduler: None,
            clock: None,
            formats: Vec::new(),
            renderer_factory: None,
        }
    }

    /// Use a configuration
    pub fn config(mut self, config: TimelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Render target for actors that have none
    pub fn context(mut self, context: RenderTarget) -> Self {
        self.context = Some(context);
        self
    }

    /// Frame scheduler
    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    /// Time source
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Register a format next to JSON and RON
    pub fn format(mut self, format: impl TimelineFormat + 'static) -> Self {
        self.formats.push(Box::new(format));
        self
    }

    /// Renderer for actors added without one
    pub fn renderer(mut self, factory: impl Fn() -> Box<dyn ActorRenderer> + 'static) -> Self {
        self.renderer_factory = Some(Box::new(factory));
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<Timeline> {
        self.config.validate()?;

        let mut seen = vec![JsonFormat.name().to_string(), RonFormat.name().to_string()];
        for format in &self.formats {
            let name = format.name();
            if seen.iter().any(|existing| existing == name) {
                return Err(TimelineError::DuplicateFormat(name.to_string()));
            }
            seen.push(name.to_string());
        }

        Ok(self.assemble())
    }

    fn assemble(self) -> Timeline {
        let builtin: [Box<dyn TimelineFormat>; 2] = [Box::new(JsonFormat), Box::new(RonFormat)];
        let formats = builtin
            .into_iter()
            .chain(self.formats)
            .map(|format| (format.name().to_string(), format))
            .collect();

        Timeline {
            id: TimelineId::new(),
            actors: IndexMap::new(),
            animation_length: 0,
            play_state: PlayState::Stopped,
            iterations: None,
            loop_origin: 0,
            paused_at: 0,
            last_updated: 0,
            events: EventBus::new(),
            scheduler: self
                .scheduler
                .unwrap_or_else(|| Box::new(ManualScheduler::new())),
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock::new())),
            frame: None,
            config: self.config,
            formats,
            renderer_factory: self.renderer_factory,
            context: self.context,
        }
    }
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorState;
    use crate::scheduler::ManualClock;
    use crate::value::PropertyValue;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn manual_timeline() -> (Timeline, ManualClock, ManualScheduler) {
        let clock = ManualClock::new(0);
        let scheduler = ManualScheduler::new();
        let timeline = Timeline::builder()
            .clock(clock.clone())
            .scheduler(scheduler.clone())
            .build()
            .unwrap();
        (timeline, clock, scheduler)
    }

    fn actor_ending_at(end: Millisecond) -> Actor {
        let mut actor = Actor::new();
        actor.keyframe(0, [("x", 0)]).keyframe(end, [("x", 100)]);
        actor
    }

    fn count_events(timeline: &mut Timeline, kind: EventKind) -> Rc<RefCell<usize>> {
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        timeline.on(kind, move |_| *c.borrow_mut() += 1);
        count
    }

    #[test]
    fn test_iteration_completion() {
        let (mut timeline, clock, _) = manual_timeline();
        let id = timeline.add_actor(actor_ending_at(1000));
        let completions = count_events(&mut timeline, EventKind::AnimationComplete);

        timeline.play(Some(2));
        clock.advance(2500);
        timeline.tick();

        assert_eq!(timeline.play_state(), PlayState::Stopped);
        assert_eq!(*completions.borrow(), 1);
        assert_eq!(timeline.last_updated_millisecond(), 1000);
        assert_eq!(timeline.actor(id).unwrap().state().number("x"), Some(100.0));

        clock.advance(100);
        timeline.tick();
        assert_eq!(*completions.borrow(), 1);
    }

    #[test]
    fn test_loops_until_complete() {
        let (mut timeline, clock, _) = manual_timeline();
        timeline.add_actor(actor_ending_at(1000));

        timeline.play(Some(2));
        clock.advance(1250);
        timeline.tick();
        assert!(timeline.is_playing());
        assert_eq!(timeline.last_updated_millisecond(), 250);
        assert!((timeline.last_position_updated() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pause_resume_continuity() {
        let (mut timeline, clock, _) = manual_timeline();
        timeline.add_actor(actor_ending_at(1000));

        timeline.play(None);
        clock.advance(300);
        timeline.tick();
        timeline.pause();
        assert_eq!(timeline.play_state(), PlayState::Paused);

        clock.advance(5000);
        timeline.play(None);
        timeline.tick();
        assert_eq!(timeline.last_updated_millisecond(), 300);
    }

    #[test]
    fn test_play_from() {
        let (mut timeline, clock, _) = manual_timeline();
        timeline.add_actor(actor_ending_at(1000));
        clock.set(50);

        timeline.play_from(400, None);
        timeline.tick();
        assert_eq!(timeline.last_updated_millisecond(), 400);

        timeline.stop();
        clock.advance(999);
        timeline.play_from_current(None);
        clock.advance(10);
        timeline.tick();
        assert_eq!(timeline.last_updated_millisecond(), 410);
    }

    #[test]
    fn test_scheduler_requests() {
        let (mut timeline, clock, scheduler) = manual_timeline();
        timeline.add_actor(actor_ending_at(1000));
        assert!(timeline.pending_frame().is_none());

        timeline.play(None);
        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(timeline.pending_frame(), scheduler.pending().first().copied());
        assert_eq!(scheduler.last_interval(), Some(timeline.config().frame_interval()));

        clock.advance(16);
        timeline.tick();
        assert!(timeline.pending_frame().is_some());

        timeline.pause();
        assert!(timeline.pending_frame().is_none());
        assert_eq!(scheduler.cancelled_count(), 1);

        // Ticking while paused neither updates nor reschedules
        let scheduled = scheduler.scheduled_count();
        clock.advance(100);
        timeline.tick();
        assert_eq!(timeline.last_updated_millisecond(), 16);
        assert_eq!(scheduler.scheduled_count(), scheduled);
    }

    #[test]
    fn test_ticks_keep_one_pending_frame() {
        let (mut timeline, clock, scheduler) = manual_timeline();
        timeline.add_actor(actor_ending_at(1000));
        timeline.play(None);

        for _ in 0..1000 {
            clock.advance(16);
            timeline.tick();
        }

        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(timeline.pending_frame(), scheduler.pending().first().copied());
        assert_eq!(scheduler.scheduled_count(), 1001);
        assert_eq!(scheduler.cancelled_count(), 0);
    }

    #[test]
    fn test_pause_only_when_playing() {
        let (mut timeline, _, _) = manual_timeline();
        let pauses = count_events(&mut timeline, EventKind::Pause);
        timeline.pause();
        assert_eq!(timeline.play_state(), PlayState::Stopped);

        timeline.play(None);
        timeline.pause();
        timeline.pause();
        assert_eq!(*pauses.borrow(), 1);
    }

    #[test]
    fn test_zero_length_never_completes() {
        let (mut timeline, clock, _) = manual_timeline();
        timeline.play(Some(1));
        clock.advance(100);
        timeline.tick();

        assert!(timeline.is_playing());
        assert_eq!(timeline.last_updated_millisecond(), 0);
        assert_eq!(timeline.last_position_updated(), 0.0);
    }

    #[test]
    fn test_length_aggregation() {
        let (mut timeline, _, _) = manual_timeline();
        assert_eq!(timeline.animation_length(), 0);

        let short = timeline.add_actor(actor_ending_at(1000));
        assert_eq!(timeline.animation_length(), 1000);
        let long = timeline.add_actor(actor_ending_at(2000));
        assert_eq!(timeline.animation_length(), 2000);

        let modified = count_events(&mut timeline, EventKind::TimelineModified);
        timeline.edit_actor(short, |actor| {
            actor.keyframe(3000, [("y", 1)]);
        });
        assert_eq!(timeline.animation_length(), 3000);
        assert_eq!(*modified.borrow(), 1);

        timeline.edit_actor(short, |actor| {
            actor.remove_keyframe(3000);
        });
        assert_eq!(timeline.animation_length(), 2000);

        let removed = timeline.remove_actor(long).unwrap();
        assert!(!removed.is_attached());
        assert_eq!(timeline.animation_length(), 1000);
        assert_eq!(timeline.actor_ids(), vec![short]);
        assert!(timeline.remove_actor(long).is_none());
    }

    #[test]
    fn test_edit_actor_without_changes_is_silent() {
        let (mut timeline, _, _) = manual_timeline();
        let id = timeline.add_actor(actor_ending_at(500));
        let modified = count_events(&mut timeline, EventKind::TimelineModified);

        let moved = timeline.edit_actor(id, |actor| actor.move_keyframe(0, 500));
        assert_eq!(moved, Some(false));
        timeline.edit_actor(id, |actor| {
            actor.remove_keyframe(777);
        });
        assert_eq!(*modified.borrow(), 0);
        assert_eq!(timeline.edit_actor(ActorId::new(), |_| ()), None);
    }

    #[test]
    fn test_event_order() {
        let (mut timeline, clock, _) = manual_timeline();
        let log = Rc::new(RefCell::new(Vec::new()));
        for &kind in EventKind::all() {
            let log = Rc::clone(&log);
            timeline.on(kind, move |event| log.borrow_mut().push(event.clone()));
        }

        let id = timeline.add_actor(actor_ending_at(100));
        timeline.play(Some(1));
        clock.advance(150);
        timeline.tick();

        assert_eq!(
            *log.borrow(),
            vec![
                TimelineEvent::AddActor(id),
                TimelineEvent::PlayStateChange(PlayState::Playing),
                TimelineEvent::Play,
                TimelineEvent::BeforeUpdate(100),
                TimelineEvent::AfterUpdate(100),
                TimelineEvent::PlayStateChange(PlayState::Stopped),
                TimelineEvent::Stop,
                TimelineEvent::AnimationComplete,
            ]
        );
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let (mut timeline, _, _) = manual_timeline();
        let added = count_events(&mut timeline, EventKind::AddActor);
        let id = ActorId::new();

        let mut first = Actor::with_id(id);
        first.keyframe(0, [("x", 0)]).keyframe(100, [("x", 1)]);
        assert_eq!(timeline.add_actor(first), id);

        let mut twin = Actor::with_id(id);
        twin.keyframe(0, [("x", 5)]).keyframe(900, [("x", 6)]);
        assert_eq!(timeline.add_actor(twin), id);

        assert_eq!(timeline.actor_count(), 1);
        assert_eq!(*added.borrow(), 1);
        assert_eq!(timeline.animation_length(), 100);
        assert!(timeline.actor(id).unwrap().is_attached());
    }

    #[derive(Default)]
    struct HookCounts {
        setup: Cell<usize>,
        teardown: Cell<usize>,
        stop: Cell<usize>,
    }

    struct CountingRenderer(Rc<HookCounts>);

    impl ActorRenderer for CountingRenderer {
        fn setup(&mut self, _actor: ActorId, _target: Option<&RenderTarget>) {
            self.0.setup.set(self.0.setup.get() + 1);
        }

        fn render(&mut self, _target: Option<&RenderTarget>, _state: &ActorState) {}

        fn teardown(&mut self, _actor: ActorId, _target: Option<&RenderTarget>) {
            self.0.teardown.set(self.0.teardown.get() + 1);
        }

        fn stop(&mut self) {
            self.0.stop.set(self.0.stop.get() + 1);
        }
    }

    #[test]
    fn test_renderer_lifecycle() {
        let (mut timeline, _, _) = manual_timeline();
        let counts = Rc::new(HookCounts::default());
        let id = ActorId::new();

        let actor = Actor::with_id(id).with_renderer(Box::new(CountingRenderer(Rc::clone(&counts))));
        timeline.add_actor(actor);
        let twin = Actor::with_id(id).with_renderer(Box::new(CountingRenderer(Rc::clone(&counts))));
        timeline.add_actor(twin);
        assert_eq!(counts.setup.get(), 1);

        timeline.play(None);
        timeline.stop();
        assert_eq!(counts.stop.get(), 1);

        let removed = timeline.remove_actor(id);
        assert!(removed.is_some());
        assert!(timeline.remove_actor(id).is_none());
        assert_eq!(
            (counts.setup.get(), counts.teardown.get(), counts.stop.get()),
            (1, 1, 1)
        );
    }

    struct TargetWriter {
        label: &'static str,
    }

    impl ActorRenderer for TargetWriter {
        fn render(&mut self, target: Option<&RenderTarget>, state: &ActorState) {
            let Some(target) = target else {
                return;
            };
            if let Some(lines) = target.borrow_mut().downcast_mut::<Vec<String>>() {
                let x = state.get("x").map(PropertyValue::to_string).unwrap_or_default();
                lines.push(format!("{}:{x}", self.label));
            }
        }
    }

    #[test]
    fn test_default_context_and_renderer() {
        let target: RenderTarget = Rc::new(RefCell::new(Vec::<String>::new()));
        let clock = ManualClock::new(0);
        let mut timeline = Timeline::builder()
            .clock(clock.clone())
            .context(Rc::clone(&target))
            .renderer(|| Box::new(TargetWriter { label: "default" }))
            .build()
            .unwrap();

        timeline.add_actor(actor_ending_at(1000));
        timeline.add_actor(actor_ending_at(1000).with_renderer(Box::new(TargetWriter { label: "own" })));
        timeline.update(Some(250));
        timeline.update(None);

        let target = target.borrow();
        let lines = target.downcast_ref::<Vec<String>>().unwrap();
        assert_eq!(lines, &vec!["default:25", "own:25", "default:25", "own:25"]);
    }

    #[test]
    fn test_export_import_round_trip() {
        let (mut timeline, _, _) = manual_timeline();
        let mut actor = Actor::new();
        actor
            .keyframe(0, [("x", PropertyValue::from(0)), ("color", PropertyValue::from("#000"))])
            .keyframe_with_easing(500, [("color", "rgb(255,0,0)")], "easeInOutSine")
            .keyframe_with_easing(1200, [("x", 42)], "easeOutBounce");
        timeline.add_actor(actor);
        timeline.add_actor(actor_ending_at(800));

        let exported = timeline.export_timeline();
        assert_eq!(exported.duration, 1200);

        for format in ["json", "ron"] {
            let text = timeline.export_as(format).unwrap();
            let (mut copy, _, _) = manual_timeline();
            let ids = copy.import_from(format, &text).unwrap();
            assert_eq!(ids.len(), 2);
            assert_eq!(copy.export_timeline(), exported, "{format} round trip");
        }
    }

    #[test]
    fn test_unknown_format() {
        let mut timeline = Timeline::new();
        assert_eq!(timeline.format_names(), vec!["json", "ron"]);
        assert!(matches!(timeline.export_as("xml"), Err(TimelineError::UnknownFormat(_))));
        assert!(matches!(
            timeline.import_from("xml", ""),
            Err(TimelineError::UnknownFormat(name)) if name == "xml"
        ));
    }

    #[test]
    fn test_builder_validation() {
        let bad_interval = Timeline::builder()
            .config(TimelineConfig {
                frame_interval_ms: 0.0,
            })
            .build();
        assert!(matches!(bad_interval, Err(TimelineError::Config(_))));

        let duplicate = Timeline::builder().format(JsonFormat).build();
        assert!(matches!(duplicate, Err(TimelineError::DuplicateFormat(name)) if name == "json"));
    }
}
