// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe animation engine.
//!
//! Actors own named property tracks (`x`, `opacity`, `transform`, ...) with
//! keyframes at integer milliseconds. A [`Timeline`] aggregates actors on a
//! shared clock, computes every actor's interpolated state on each frame
//! and hands it to the actor's [`ActorRenderer`].
//!
//! ## Architecture
//!
//! - [`Track`]s keep properties sorted; a property interpolates towards
//!   the one after it using that successor's easing
//! - [`Actor`]s cache which property of every track is in effect at each
//!   keyframe millisecond, so tracks inherit each other's running values
//! - The [`Timeline`] runs the play/pause/stop state machine against an
//!   injected [`Scheduler`] and [`Clock`]
//! - Timelines export to a plain data model that any [`TimelineFormat`]
//!   can encode
//!
//! ```
//! use keyframe_timeline::{Actor, Timeline};
//!
//! let mut actor = Actor::new();
//! actor.keyframe(0, [("x", 0)]).keyframe(1000, [("x", 100)]);
//!
//! let mut timeline = Timeline::new();
//! let id = timeline.add_actor(actor);
//! timeline.update(Some(500));
//! assert_eq!(timeline.actor(id).unwrap().state().number("x"), Some(50.0));
//! ```

pub mod actor;
pub mod config;
pub mod easing;
pub mod error;
pub mod event;
pub mod export;
pub mod property;
pub mod render;
pub mod scheduler;
pub mod timeline;
pub mod track;
pub mod value;

/// Position on a timeline, in milliseconds
pub type Millisecond = u64;

pub use actor::{Actor, ActorId, ActorState, KeyframeEasing};
pub use config::TimelineConfig;
pub use easing::{Easing, EasingChain};
pub use error::{Result, TimelineError};
pub use event::{EventBus, EventKind, HandlerId, TimelineEvent};
pub use export::{ActorData, JsonFormat, PropertyData, RonFormat, TimelineData, TimelineFormat};
pub use property::{KeyframeProperty, KeyframePropertyId, PropertyPatch};
pub use render::{ActorRenderer, RenderTarget, RendererFactory};
pub use scheduler::{Clock, FrameHandle, ManualClock, ManualScheduler, Scheduler, SystemClock};
pub use timeline::{PlayState, Timeline, TimelineBuilder, TimelineId};
pub use track::Track;
pub use value::PropertyValue;
