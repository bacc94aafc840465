// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame scheduling and time sources.
//!
//! A timeline does not own a frame loop. While playing it asks its
//! [`Scheduler`] for one frame at a time and expects the host to call
//! [`crate::Timeline::tick`] when that frame is due. Time is read from a
//! [`Clock`], which tests replace with a [`ManualClock`].

use crate::Millisecond;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Handle to a requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Wrap a scheduler-specific id
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Requests and cancels frames
pub trait Scheduler {
    /// Request a frame after `interval`
    fn schedule(&mut self, interval: Duration) -> FrameHandle;

    /// Cancel a pending frame. Unknown handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);

    /// The frame behind `handle` was delivered and consumed
    fn complete(&mut self, _handle: FrameHandle) {}
}

/// Monotonic time source in milliseconds
pub trait Clock {
    /// Current time
    fn now(&self) -> Millisecond;
}

/// Wall clock measured from its creation
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock at zero
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millisecond {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Virtual clock moved by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millisecond>>,
}

impl ManualClock {
    /// Create a clock reading `start`
    pub fn new(start: Millisecond) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move forward
    pub fn advance(&self, by: Millisecond) {
        self.now.set(self.now.get().saturating_add(by));
    }

    /// Jump to an absolute time
    pub fn set(&self, to: Millisecond) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millisecond {
        self.now.get()
    }
}

#[derive(Debug, Default)]
struct ManualSchedulerState {
    next_id: u64,
    pending: Vec<FrameHandle>,
    scheduled: usize,
    cancelled: usize,
    last_interval: Option<Duration>,
}

/// Scheduler that only records requests; the host ticks the timeline
/// itself. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualSchedulerState>>,
}

impl ManualScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested and not yet cancelled
    pub fn pending(&self) -> Vec<FrameHandle> {
        self.state.borrow().pending.clone()
    }

    /// Total frames requested
    pub fn scheduled_count(&self) -> usize {
        self.state.borrow().scheduled
    }

    /// Total frames cancelled
    pub fn cancelled_count(&self) -> usize {
        self.state.borrow().cancelled
    }

    /// Interval of the most recent request
    pub fn last_interval(&self) -> Option<Duration> {
        self.state.borrow().last_interval
    }

    /// Mark a frame as delivered
    pub fn fire(&self, handle: FrameHandle) -> bool {
        self.state.borrow_mut().remove(handle)
    }
}

impl ManualSchedulerState {
    fn remove(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        self.pending.len() != before
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, interval: Duration) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        let handle = FrameHandle(state.next_id);
        state.next_id += 1;
        state.scheduled += 1;
        state.last_interval = Some(interval);
        state.pending.push(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        if state.remove(handle) {
            state.cancelled += 1;
        }
    }

    fn complete(&mut self, handle: FrameHandle) {
        self.state.borrow_mut().remove(handle);
    }
}
