//! Timed histogram sinks.
//!
//! A [`TimedHistogram`] is the destination for completed region samples.
//! Bucketing, percentile statistics and persistence are out of scope for
//! this crate; the sink keeps a bounded window of raw samples and can
//! export summary snapshots.

use crate::config::{InstrumentConfig, DEFAULT_MAX_SAMPLES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

/// A named histogram that accumulates duration samples.
///
/// Interior-mutable and `!Sync`: one histogram belongs to one logical
/// execution context and is shared within it by reference.
#[derive(Debug)]
pub struct TimedHistogram {
    name: String,
    enabled: Cell<bool>,
    /// Debug-only reentrancy guard; see [`TimedHistogram::toggle_running`].
    running: Cell<bool>,
    max_samples: usize,
    samples: RefCell<VecDeque<Duration>>,
}

impl TimedHistogram {
    /// Create an enabled histogram with default sample retention.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_settings(name, true, DEFAULT_MAX_SAMPLES)
    }

    /// Create a histogram with explicit enablement and retention.
    pub fn with_settings(name: impl Into<String>, enabled: bool, max_samples: usize) -> Self {
        Self {
            name: name.into(),
            enabled: Cell::new(enabled),
            running: Cell::new(false),
            max_samples,
            samples: RefCell::new(VecDeque::new()),
        }
    }

    /// Create a histogram from a registry configuration.
    pub fn from_config(name: impl Into<String>, config: &InstrumentConfig) -> Self {
        Self::with_settings(name, config.enabled, config.max_samples)
    }

    /// The histogram's label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether samples are currently being collected.
    ///
    /// Scopes snapshot this flag at construction; toggling it while a
    /// scope is live does not affect that scope.
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Enable or disable collection for scopes created from now on.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// Flip the running-state guard, returning `true` if the state
    /// actually changed.
    ///
    /// This is a debug-only invariant helper: non-nesting scopes assert
    /// `toggle_running(true)` on entry and `toggle_running(false)` on
    /// exit, which catches two plain scopes alive on the same histogram
    /// at once. It is not a lock, and release builds skip the check
    /// entirely.
    pub fn toggle_running(&self, running: bool) -> bool {
        self.running.replace(running) != running
    }

    /// Accumulate one completed sample.
    pub fn record(&self, duration: Duration) {
        let mut samples = self.samples.borrow_mut();
        if samples.len() >= self.max_samples {
            samples.pop_front();
        }
        samples.push_back(duration);
        tracing::trace!(
            target: "instrument",
            histogram = self.name.as_str(),
            duration_us = duration.as_micros() as u64,
            "sample recorded"
        );
    }

    /// Number of retained samples.
    pub fn sample_count(&self) -> usize {
        self.samples.borrow().len()
    }

    /// Copy of the retained samples, oldest first.
    pub fn samples(&self) -> Vec<Duration> {
        self.samples.borrow().iter().copied().collect()
    }

    /// Drop all retained samples.
    pub fn clear(&self) {
        self.samples.borrow_mut().clear();
    }

    /// Summarize the retained samples.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let samples = self.samples.borrow();
        let count = samples.len();
        let total: Duration = samples.iter().sum();
        let min = samples.iter().min().copied().unwrap_or(Duration::ZERO);
        let max = samples.iter().max().copied().unwrap_or(Duration::ZERO);
        let mean = if count > 0 { total / count as u32 } else { Duration::ZERO };

        HistogramSnapshot {
            name: self.name.clone(),
            count,
            total,
            min,
            max,
            mean,
            captured_at: Utc::now(),
        }
    }
}

/// Point-in-time summary of a histogram's retained samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramSnapshot {
    /// Histogram label
    pub name: String,
    /// Number of retained samples
    pub count: usize,
    /// Sum of retained samples
    #[serde(with = "duration_serde")]
    pub total: Duration,
    /// Smallest retained sample
    #[serde(with = "duration_serde")]
    pub min: Duration,
    /// Largest retained sample
    #[serde(with = "duration_serde")]
    pub max: Duration,
    /// Mean of retained samples
    #[serde(with = "duration_serde")]
    pub mean: Duration,
    /// When the snapshot was captured
    pub captured_at: DateTime<Utc>,
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_nanos() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_new_histogram() {
        let hist = TimedHistogram::new("parse_time");
        assert_eq!(hist.name(), "parse_time");
        assert!(hist.is_enabled());
        assert_eq!(hist.sample_count(), 0);
    }

    #[test]
    fn test_set_enabled() {
        let hist = TimedHistogram::new("parse_time");
        hist.set_enabled(false);
        assert!(!hist.is_enabled());
        hist.set_enabled(true);
        assert!(hist.is_enabled());
    }

    #[test]
    fn test_toggle_running_detects_double_entry() {
        let hist = TimedHistogram::new("parse_time");
        assert!(hist.toggle_running(true));
        // A second entry does not change the state.
        assert!(!hist.toggle_running(true));
        assert!(hist.toggle_running(false));
    }

    #[test]
    fn test_record_and_samples() {
        let hist = TimedHistogram::new("parse_time");
        hist.record(ms(5));
        hist.record(ms(25));
        assert_eq!(hist.sample_count(), 2);
        assert_eq!(hist.samples(), vec![ms(5), ms(25)]);
    }

    #[test]
    fn test_record_caps_retention() {
        let hist = TimedHistogram::with_settings("parse_time", true, 3);
        for i in 0..5 {
            hist.record(ms(i));
        }
        assert_eq!(hist.sample_count(), 3);
        // Oldest samples discarded.
        assert_eq!(hist.samples(), vec![ms(2), ms(3), ms(4)]);
    }

    #[test]
    fn test_clear() {
        let hist = TimedHistogram::new("parse_time");
        hist.record(ms(1));
        hist.clear();
        assert_eq!(hist.sample_count(), 0);
    }

    #[test]
    fn test_snapshot_summary() {
        let hist = TimedHistogram::new("parse_time");
        hist.record(ms(10));
        hist.record(ms(20));
        hist.record(ms(30));

        let snapshot = hist.snapshot();
        assert_eq!(snapshot.name, "parse_time");
        assert_eq!(snapshot.count, 3);
        assert_eq!(snapshot.total, ms(60));
        assert_eq!(snapshot.min, ms(10));
        assert_eq!(snapshot.max, ms(30));
        assert_eq!(snapshot.mean, ms(20));
    }

    #[test]
    fn test_snapshot_empty() {
        let snapshot = TimedHistogram::new("parse_time").snapshot();
        assert_eq!(snapshot.count, 0);
        assert_eq!(snapshot.total, Duration::ZERO);
        assert_eq!(snapshot.mean, Duration::ZERO);
    }

    #[test]
    fn test_snapshot_serialization_roundtrip() {
        let hist = TimedHistogram::new("parse_time");
        hist.record(ms(7));

        let snapshot = hist.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("capturedAt"));
        let parsed: HistogramSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, parsed);
    }

    #[test]
    fn test_from_config() {
        let config = InstrumentConfig::disabled().with_max_samples(2);
        let hist = TimedHistogram::from_config("parse_time", &config);
        assert!(!hist.is_enabled());
        hist.record(ms(1));
        hist.record(ms(2));
        hist.record(ms(3));
        assert_eq!(hist.sample_count(), 2);
    }
}
