//! Execution context and event logging.
//!
//! An [`ExecutionContext`] stands for the single logical execution context
//! (one interpreter, one event loop, one worker) whose regions are being
//! measured. It owns the per-context long-task accumulator and the event
//! logger that receives region start/end trace events.

use std::cell::Cell;
use std::fmt;

/// Phase of a region trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    /// Region entered
    Start,
    /// Region exited
    End,
}

impl EventPhase {
    /// Stable lowercase name, for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            EventPhase::Start => "start",
            EventPhase::End => "end",
        }
    }
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for region start/end trace events.
///
/// The default implementation forwards to `tracing`; tests substitute a
/// counting logger to observe emission without a subscriber.
pub trait EventLogger {
    /// Emit one event for the named histogram.
    fn emit(&self, histogram: &str, phase: EventPhase);
}

/// [`EventLogger`] that emits `tracing` trace events.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl EventLogger for TracingLogger {
    fn emit(&self, histogram: &str, phase: EventPhase) {
        tracing::trace!(
            target: "instrument",
            histogram = histogram,
            phase = phase.as_str(),
            "region event"
        );
    }
}

/// Per-context accumulator for long-task time.
///
/// Regions flagged for long-task recording on the designated execute
/// histogram add their elapsed microseconds here.
#[derive(Debug, Default)]
pub struct LongTaskStats {
    execute_us: Cell<u64>,
}

impl LongTaskStats {
    /// Microseconds of execute time accumulated so far.
    pub fn execute_us(&self) -> u64 {
        self.execute_us.get()
    }

    /// Add `us` microseconds of execute time.
    pub fn add_execute_us(&self, us: u64) {
        self.execute_us.set(self.execute_us.get() + us);
    }

    /// Reset the accumulator, e.g. at a task boundary.
    pub fn reset(&self) {
        self.execute_us.set(0);
    }
}

/// The execution context that owns long-task stats and the event logger.
pub struct ExecutionContext {
    long_task: LongTaskStats,
    logger: Box<dyn EventLogger>,
}

impl ExecutionContext {
    /// Create a context logging through `tracing`.
    pub fn new() -> Self {
        Self::with_logger(Box::new(TracingLogger))
    }

    /// Create a context with a custom event logger.
    pub fn with_logger(logger: Box<dyn EventLogger>) -> Self {
        Self {
            long_task: LongTaskStats::default(),
            logger,
        }
    }

    /// The per-context long-task accumulator.
    pub fn long_task_stats(&self) -> &LongTaskStats {
        &self.long_task
    }

    /// Emit a region trace event through the configured logger.
    pub fn emit(&self, histogram: &str, phase: EventPhase) {
        self.logger.emit(histogram, phase);
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("long_task", &self.long_task)
            .finish_non_exhaustive()
    }
}
