//! Pausable Monotonic Timing
//!
//! This crate provides the clock primitive used by scoped instrumentation:
//! a timer that can be paused and resumed so that its elapsed reading is
//! the sum of all intervals during which it was actually running.
//!
//! All state transitions take an explicit [`Instant`], which keeps one
//! measurement step atomic across several timers (pause the outer, start
//! the inner, at the *same* timestamp) and makes tests deterministic.
//!
//! # Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use timing::PausableTimer;
//!
//! let t0 = Instant::now();
//! let mut timer = PausableTimer::new();
//! timer.start(t0);
//! timer.pause(t0 + Duration::from_millis(10));
//! timer.resume(t0 + Duration::from_millis(25));
//! let elapsed = timer.elapsed(t0 + Duration::from_millis(30));
//! assert_eq!(elapsed, Duration::from_millis(15));
//! ```

mod timer;

pub use timer::PausableTimer;

/// Re-export for convenience
pub use std::time::{Duration, Instant};
