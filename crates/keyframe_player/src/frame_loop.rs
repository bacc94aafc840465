// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sleeping frame loop.
//!
//! [`IntervalScheduler`] remembers the single frame a timeline requested and
//! when it is due. [`run`] sleeps until that deadline, ticks the timeline,
//! and repeats until the timeline stops asking for frames or the runtime
//! limit is hit.

use keyframe_timeline::{FrameHandle, Scheduler, Timeline};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct FrameQueue {
    next_id: u64,
    pending: Option<(FrameHandle, Instant)>,
}

/// Scheduler backed by deadlines. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct IntervalScheduler {
    queue: Rc<RefCell<FrameQueue>>,
}

impl IntervalScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// When the pending frame is due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.borrow().pending.map(|(_, deadline)| deadline)
    }

    /// Take the pending frame if it is due at `now`
    pub fn take_due(&self, now: Instant) -> Option<FrameHandle> {
        let mut queue = self.queue.borrow_mut();
        let pending = queue.pending;
        match pending {
            Some((handle, deadline)) if deadline <= now => {
                queue.pending = None;
                Some(handle)
            }
            _ => None,
        }
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule(&mut self, interval: Duration) -> FrameHandle {
        let mut queue = self.queue.borrow_mut();
        let handle = FrameHandle::new(queue.next_id);
        queue.next_id += 1;
        queue.pending = Some((handle, Instant::now() + interval));
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let mut queue = self.queue.borrow_mut();
        if queue.pending.is_some_and(|(pending, _)| pending == handle) {
            queue.pending = None;
        }
    }
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The timeline stopped requesting frames
    Finished,
    /// The runtime limit was reached and the timeline was stopped
    TimedOut,
}

/// Result of a loop run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    /// Frames ticked
    pub frames: u64,
    /// Why the loop ended
    pub exit: LoopExit,
}

/// Drive `timeline` through `scheduler` until it finishes or `max_runtime`
/// elapses
pub fn run(timeline: &mut Timeline, scheduler: &IntervalScheduler, max_runtime: Option<Duration>) -> LoopSummary {
    let started = Instant::now();
    let mut frames = 0;

    loop {
        let Some(deadline) = scheduler.next_deadline() else {
            return LoopSummary {
                frames,
                exit: LoopExit::Finished,
            };
        };

        if max_runtime.is_some_and(|limit| deadline.duration_since(started) > limit) {
            tracing::warn!(frames, "Runtime limit reached, stopping timeline");
            timeline.stop();
            return LoopSummary {
                frames,
                exit: LoopExit::TimedOut,
            };
        }

        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }

        if scheduler.take_due(Instant::now()).is_some() {
            timeline.tick();
            frames += 1;
        }
    }
}
