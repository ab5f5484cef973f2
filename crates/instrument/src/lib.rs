//! Scoped Region Timing
//!
//! This crate measures wall-clock time spent in labeled regions of a host
//! program and feeds completed measurements into named histograms, with
//! correct accounting for nesting and for time spent outside the
//! monitored domain:
//!
//! - RAII scope guards that commit exactly one sample per region
//! - A per-histogram region stack that pauses the enclosing region while
//!   a nested region runs, so no instant is charged twice
//! - An external pause handle for callbacks that leave the monitored
//!   domain without holding a reference to the active region
//! - Long-task accounting on a designated execute histogram
//! - A name-keyed registry with serde snapshots
//!
//! Everything here is single-threaded cooperative bookkeeping: histograms
//! use interior mutability and belong to one logical execution context.
//! Scope misuse (two plain scopes on one histogram, a lazy scope dropped
//! unbound, non-LIFO drops) is a programmer error checked with debug
//! assertions only; release builds leave those preconditions unchecked.
//!
//! # Example
//!
//! ```rust
//! use instrument::{Counters, NestedTimerScope, PauseScope};
//!
//! let counters = Counters::new();
//! let execute = counters.create_execute("execute_time").unwrap();
//!
//! {
//!     let _outer = NestedTimerScope::with_long_task(&execute);
//!     {
//!         // Reentry: the outer region is paused while this one runs.
//!         let _inner = NestedTimerScope::new(&execute);
//!     }
//!     {
//!         // Leaving the domain: nothing is charged while paused.
//!         let _external = PauseScope::new(&execute);
//!     }
//! }
//!
//! assert_eq!(execute.sample_count(), 2);
//! ```
//!
//! # Modules
//!
//! - [`histogram`] - Timed histogram sinks and snapshots
//! - [`nested`] - Nested-capable sinks and the region stack protocol
//! - [`scopes`] - RAII scope guard variants and the pause handle
//! - [`counters`] - Name-keyed histogram registry
//! - [`context`] - Execution context, long-task stats, event logging
//! - [`config`] - Collection configuration
//! - [`error`] - Error types

pub mod config;
pub mod context;
mod counters;
mod error;
pub mod histogram;
pub mod nested;
pub mod scopes;

pub use config::InstrumentConfig;
pub use context::{EventLogger, EventPhase, ExecutionContext, LongTaskStats, TracingLogger};
pub use counters::Counters;
pub use error::{InstrumentError, InstrumentResult};
pub use histogram::{HistogramSnapshot, TimedHistogram};
pub use nested::{FrameToken, NestedTimedHistogram};
pub use scopes::{
    LazyScope, LongTaskMode, NestedTimerScope, OptionalScope, PauseScope, ScopeMode, TimedScope,
};
