//! Nested-capable histogram sinks.
//!
//! A [`NestedTimedHistogram`] owns an explicit stack of active region
//! frames and implements the pause-ancestor/resume-ancestor protocol:
//! entering a region suspends whichever region was on top, so that only
//! the innermost live region accrues wall-clock time. An ancestor's total
//! is therefore the sum of the intervals during which it was itself on
//! top, which is exactly "this call, excluding nested sub-calls on the
//! same histogram".
//!
//! Scope guards hold a depth token into the stack rather than links to
//! each other; strict LIFO order is guaranteed by guard drop order and
//! debug-asserted on every pop.

use crate::context::ExecutionContext;
use crate::histogram::TimedHistogram;
use crate::InstrumentConfig;
use std::cell::RefCell;
use std::ops::Deref;
use std::rc::Rc;
use std::time::{Duration, Instant};
use timing::PausableTimer;

/// One entry on the active-region stack.
#[derive(Debug)]
enum Frame {
    /// A live region and its timer. The top region's timer runs; every
    /// region below is paused.
    Region { timer: PausableTimer },
    /// An anonymous suspension pushed by a pause handle. Nothing accrues
    /// to it; the region below stays paused until it is popped.
    Pause,
}

/// Token identifying a frame pushed by [`NestedTimedHistogram::enter`] or
/// [`NestedTimedHistogram::pause_current`]; returned to the matching pop.
pub type FrameToken = usize;

/// A [`TimedHistogram`] that supports reentrant regions.
#[derive(Debug)]
pub struct NestedTimedHistogram {
    base: TimedHistogram,
    context: Rc<ExecutionContext>,
    /// Whether this is the designated execute histogram for long-task
    /// attribution.
    is_execute: bool,
    frames: RefCell<Vec<Frame>>,
}

impl NestedTimedHistogram {
    /// Create an enabled nested histogram with default retention.
    pub fn new(name: impl Into<String>, context: Rc<ExecutionContext>) -> Self {
        Self::with_settings(TimedHistogram::new(name), context, false)
    }

    /// Create a nested histogram from a registry configuration.
    pub fn from_config(
        name: impl Into<String>,
        config: &InstrumentConfig,
        context: Rc<ExecutionContext>,
    ) -> Self {
        Self::with_settings(TimedHistogram::from_config(name, config), context, false)
    }

    /// Wrap a base histogram, optionally designating it as the execute
    /// histogram for long-task attribution.
    pub fn with_settings(
        base: TimedHistogram,
        context: Rc<ExecutionContext>,
        is_execute: bool,
    ) -> Self {
        Self {
            base,
            context,
            is_execute,
            frames: RefCell::new(Vec::new()),
        }
    }

    /// The base histogram sink.
    pub fn base(&self) -> &TimedHistogram {
        &self.base
    }

    /// The execution context this histogram reports into.
    pub fn context(&self) -> &Rc<ExecutionContext> {
        &self.context
    }

    /// Whether this histogram is the designated execute histogram.
    pub fn is_execute(&self) -> bool {
        self.is_execute
    }

    /// Number of frames currently on the stack (regions and pauses).
    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Enter a new region at `now`: suspend the current top region, if
    /// any, and push a frame whose timer starts at `now`.
    ///
    /// Callers must pass the returned token to [`leave`](Self::leave) in
    /// strict LIFO order with respect to every other push on this
    /// histogram.
    pub fn enter(&self, now: Instant) -> FrameToken {
        let mut frames = self.frames.borrow_mut();
        if let Some(Frame::Region { timer }) = frames.last_mut() {
            timer.pause(now);
        }
        frames.push(Frame::Region {
            timer: PausableTimer::started(now),
        });
        frames.len() - 1
    }

    /// Leave the region identified by `token` at `now`, returning its
    /// accrued duration and resuming the region underneath, if any.
    ///
    /// The frame below may be a pause frame, in which case the next
    /// region stays suspended until the pause handle is dropped.
    pub fn leave(&self, token: FrameToken, now: Instant) -> Duration {
        let mut frames = self.frames.borrow_mut();
        debug_assert_eq!(frames.len(), token + 1, "regions left out of LIFO order");

        let elapsed = match frames.pop() {
            Some(Frame::Region { timer }) => timer.elapsed(now),
            _ => {
                debug_assert!(false, "left a frame that was not a region");
                Duration::ZERO
            }
        };

        if let Some(Frame::Region { timer }) = frames.last_mut() {
            timer.resume(now);
        }
        elapsed
    }

    /// Suspend whichever region is currently on top, without entering a
    /// region. Returns a token if a region was captured; `None` when the
    /// stack is empty or already suspended, in which case there is
    /// nothing to restore.
    pub fn pause_current(&self, now: Instant) -> Option<FrameToken> {
        let mut frames = self.frames.borrow_mut();
        match frames.last_mut() {
            Some(Frame::Region { timer }) => {
                timer.pause(now);
                frames.push(Frame::Pause);
                Some(frames.len() - 1)
            }
            // Not every call site that leaves the monitored domain is
            // wrapped, so a pause over an empty or already-paused stack
            // is tolerated silently.
            _ => None,
        }
    }

    /// Pop the pause frame identified by `token` and resume the region it
    /// had suspended.
    pub fn resume_current(&self, token: FrameToken, now: Instant) {
        let mut frames = self.frames.borrow_mut();
        debug_assert_eq!(frames.len(), token + 1, "pause handles dropped out of LIFO order");
        debug_assert!(matches!(frames.last(), Some(Frame::Pause)));
        frames.pop();

        if let Some(Frame::Region { timer }) = frames.last_mut() {
            timer.resume(now);
        }
    }
}

impl Deref for NestedTimedHistogram {
    type Target = TimedHistogram;

    fn deref(&self) -> &TimedHistogram {
        &self.base
    }
}
