//! RAII scope guards over histogram sinks.
//!
//! Each guard measures one region: it starts timing at construction and
//! commits exactly one sample when dropped, on every exit path including
//! unwinding. Enablement is snapshotted when the guard is created, so
//! toggling a histogram mid-region affects only guards created afterward.
//!
//! A disabled histogram makes every variant a complete no-op: no timer
//! activity, no sample, no trace events.

use crate::context::{EventPhase, ExecutionContext};
use crate::histogram::TimedHistogram;
use crate::nested::{FrameToken, NestedTimedHistogram};
use std::time::Instant;
use timing::PausableTimer;

/// Guard that times one region against a plain (non-nesting) histogram.
///
/// Two live guards on the same histogram are a programmer error, caught
/// by the debug running-state guard. Use [`NestedTimerScope`] for
/// reentrant regions.
#[must_use = "the scope measures until it is dropped"]
pub struct TimedScope<'a> {
    histogram: &'a TimedHistogram,
    context: Option<&'a ExecutionContext>,
    timer: PausableTimer,
    /// Enablement snapshot taken at construction.
    active: bool,
}

impl<'a> TimedScope<'a> {
    /// Start timing `histogram`, without trace events.
    pub fn new(histogram: &'a TimedHistogram) -> Self {
        Self::with_context(histogram, None)
    }

    /// Start timing `histogram`, emitting start/end trace events through
    /// `context` if one is given.
    pub fn with_context(
        histogram: &'a TimedHistogram,
        context: Option<&'a ExecutionContext>,
    ) -> Self {
        let active = histogram.is_enabled();
        let mut timer = PausableTimer::new();
        if active {
            debug_assert!(histogram.toggle_running(true), "histogram already has a live scope");
            timer.start(Instant::now());
            if let Some(context) = context {
                context.emit(histogram.name(), EventPhase::Start);
            }
        }
        Self {
            histogram,
            context,
            timer,
            active,
        }
    }
}

impl Drop for TimedScope<'_> {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        debug_assert!(self.histogram.toggle_running(false));
        self.histogram.record(self.timer.elapsed(Instant::now()));
        if let Some(context) = self.context {
            context.emit(self.histogram.name(), EventPhase::End);
        }
    }
}

/// Whether an [`OptionalScope`] should measure at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    /// Time the region as a [`TimedScope`] would.
    TakeTime,
    /// Skip the entire timing and logging sequence.
    DontTakeTime,
}

/// Guard whose measurement can be switched off at the call site.
///
/// `DontTakeTime` disables instrumentation for this region without
/// branching at every call site; the mode is fixed for the guard's
/// lifetime.
#[must_use = "the scope measures until it is dropped"]
pub struct OptionalScope<'a> {
    inner: Option<TimedScope<'a>>,
    mode: ScopeMode,
}

impl<'a> OptionalScope<'a> {
    /// Start timing `histogram` if `mode` is [`ScopeMode::TakeTime`].
    pub fn new(
        histogram: &'a TimedHistogram,
        context: Option<&'a ExecutionContext>,
        mode: ScopeMode,
    ) -> Self {
        let inner = match mode {
            ScopeMode::TakeTime => Some(TimedScope::with_context(histogram, context)),
            ScopeMode::DontTakeTime => None,
        };
        Self { inner, mode }
    }

    /// The mode this scope was constructed with.
    pub fn mode(&self) -> ScopeMode {
        self.mode
    }
}

/// Guard that starts timing before its histogram is known.
///
/// The timer starts unconditionally at construction; the sink is supplied
/// later with [`bind`](Self::bind), which must happen before the guard is
/// dropped. Dropping an unbound guard is a programmer error (debug
/// assertion); release builds discard the measurement.
#[must_use = "the scope measures until it is dropped"]
pub struct LazyScope<'a> {
    timer: PausableTimer,
    histogram: Option<&'a TimedHistogram>,
    /// Enablement snapshot taken at bind time.
    active: bool,
}

impl<'a> LazyScope<'a> {
    /// Start timing immediately, with no sink bound yet.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            timer: PausableTimer::started(Instant::now()),
            histogram: None,
            active: false,
        }
    }

    /// Bind the histogram that will receive the sample.
    pub fn bind(&mut self, histogram: &'a TimedHistogram) {
        debug_assert!(self.histogram.is_none(), "lazy scope bound twice");
        self.active = histogram.is_enabled();
        if self.active {
            debug_assert!(histogram.toggle_running(true), "histogram already has a live scope");
        }
        self.histogram = Some(histogram);
    }
}

impl Drop for LazyScope<'_> {
    fn drop(&mut self) {
        match self.histogram {
            Some(histogram) if self.active => {
                debug_assert!(histogram.toggle_running(false));
                histogram.record(self.timer.elapsed(Instant::now()));
            }
            Some(_) => {}
            None => debug_assert!(false, "lazy scope dropped without a bound histogram"),
        }
    }
}

/// Whether a [`NestedTimerScope`] also feeds the per-context long-task
/// accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongTaskMode {
    /// Only record the histogram sample.
    Skip,
    /// Additionally add the elapsed microseconds to the execution
    /// context's long-task stats, if this is the execute histogram.
    Record,
}

/// Guard for a reentrant region on a [`NestedTimedHistogram`].
///
/// Entering suspends the enclosing region on the same histogram; leaving
/// resumes it. Guards must be dropped in reverse construction order per
/// histogram, which scoped ownership guarantees.
#[must_use = "the scope measures until it is dropped"]
pub struct NestedTimerScope<'a> {
    histogram: &'a NestedTimedHistogram,
    token: Option<FrameToken>,
    long_task: LongTaskMode,
}

impl<'a> NestedTimerScope<'a> {
    /// Enter a region without long-task recording.
    pub fn new(histogram: &'a NestedTimedHistogram) -> Self {
        Self::with_mode(histogram, LongTaskMode::Skip)
    }

    /// Enter a region that also contributes to long-task stats.
    pub fn with_long_task(histogram: &'a NestedTimedHistogram) -> Self {
        Self::with_mode(histogram, LongTaskMode::Record)
    }

    /// Enter a region with an explicit long-task mode.
    pub fn with_mode(histogram: &'a NestedTimedHistogram, long_task: LongTaskMode) -> Self {
        let token = if histogram.is_enabled() {
            let token = histogram.enter(Instant::now());
            histogram.context().emit(histogram.name(), EventPhase::Start);
            Some(token)
        } else {
            None
        };
        Self {
            histogram,
            token,
            long_task,
        }
    }
}

impl Drop for NestedTimerScope<'_> {
    fn drop(&mut self) {
        let Some(token) = self.token else { return };
        let elapsed = self.histogram.leave(token, Instant::now());
        self.histogram.record(elapsed);
        if self.long_task == LongTaskMode::Record && self.histogram.is_execute() {
            self.histogram
                .context()
                .long_task_stats()
                .add_execute_us(elapsed.as_micros() as u64);
        }
        self.histogram.context().emit(self.histogram.name(), EventPhase::End);
    }
}

/// Suspends whichever region is active on a histogram, for code leaving
/// the monitored domain without a reference to that region.
///
/// Dropping the handle resumes the captured region. If no region was
/// active when the handle was created, both ends are silent no-ops.
#[must_use = "the pause lasts until the handle is dropped"]
pub struct PauseScope<'a> {
    histogram: &'a NestedTimedHistogram,
    token: Option<FrameToken>,
}

impl<'a> PauseScope<'a> {
    /// Suspend the current region on `histogram`, if any.
    pub fn new(histogram: &'a NestedTimedHistogram) -> Self {
        let token = if histogram.is_enabled() {
            histogram.pause_current(Instant::now())
        } else {
            None
        };
        Self { histogram, token }
    }
}

impl Drop for PauseScope<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token {
            self.histogram.resume_current(token, Instant::now());
        }
    }
}
