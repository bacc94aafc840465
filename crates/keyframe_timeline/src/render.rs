// SPDX-License-Identifier: MIT OR Apache-2.0
//! Render strategies for actors.
//!
//! The engine never draws anything itself. Each actor may carry an
//! [`ActorRenderer`] that receives the computed state on every timeline
//! update and writes it to whatever surface the render target stands for
//! (a canvas, a DOM node, a terminal, a test buffer).

use crate::actor::{ActorId, ActorState};
use crate::value::PropertyValue;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Opaque, shared drawing surface handed to renderers.
///
/// Actors that have none inherit the timeline's target when added.
pub type RenderTarget = Rc<RefCell<dyn Any>>;

/// Creates a renderer for actors that are added without one
pub type RendererFactory = Box<dyn Fn() -> Box<dyn ActorRenderer>>;

/// Render strategy attached to an actor
pub trait ActorRenderer {
    /// Called once when the actor is added to a timeline
    fn setup(&mut self, _actor: ActorId, _target: Option<&RenderTarget>) {}

    /// Called on every timeline update with the actor's current state
    fn render(&mut self, target: Option<&RenderTarget>, state: &ActorState);

    /// Called once when the actor is removed from a timeline
    fn teardown(&mut self, _actor: ActorId, _target: Option<&RenderTarget>) {}

    /// Called when the timeline stops; cancel any in-flight effects
    fn stop(&mut self) {}

    /// Adjust the endpoint values of a segment before they are interpolated,
    /// e.g. to normalise a syntax the tokenizer would misread
    fn before_interpolate(&self, _track: &str, _from: &mut PropertyValue, _to: &mut PropertyValue) {}

    /// Adjust an interpolated value before it is stored in the state
    fn after_interpolate(&self, _track: &str, _value: &mut PropertyValue) {}
}
