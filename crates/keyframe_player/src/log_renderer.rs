// SPDX-License-Identifier: MIT OR Apache-2.0
//! Renderer that writes actor states to the log.

use keyframe_timeline::{ActorId, ActorRenderer, ActorState, RenderTarget};

/// Logs every rendered state at info level
#[derive(Debug, Default)]
pub struct LogRenderer {
    actor: Option<ActorId>,
    frames: u64,
}

impl LogRenderer {
    /// Create a renderer not yet bound to an actor
    pub fn new() -> Self {
        Self::default()
    }
}

/// `name=value` pairs in track order
pub fn format_state(state: &ActorState) -> String {
    state
        .iter()
        .map(|(track, value)| format!("{track}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl ActorRenderer for LogRenderer {
    fn setup(&mut self, actor: ActorId, _target: Option<&RenderTarget>) {
        self.actor = Some(actor);
        tracing::debug!(%actor, "Renderer attached");
    }

    fn render(&mut self, _target: Option<&RenderTarget>, state: &ActorState) {
        self.frames += 1;
        let actor = self.actor.map(|id| id.to_string()).unwrap_or_default();
        tracing::info!(actor = %actor, frame = self.frames, "{}", format_state(state));
    }

    fn teardown(&mut self, actor: ActorId, _target: Option<&RenderTarget>) {
        tracing::debug!(%actor, frames = self.frames, "Renderer detached");
        self.actor = None;
    }

    fn stop(&mut self) {
        tracing::debug!(frames = self.frames, "Renderer stopped");
    }
}
