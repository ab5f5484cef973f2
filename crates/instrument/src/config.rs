//! Configuration for instrumentation collection.

use serde::{Deserialize, Serialize};

/// Default number of samples retained per histogram.
pub const DEFAULT_MAX_SAMPLES: usize = 1000;

/// Configuration for a [`Counters`](crate::Counters) registry.
///
/// Enablement is applied to every histogram the registry creates;
/// see the crate docs for how mid-scope toggling is treated (each scope
/// snapshots enablement at construction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentConfig {
    /// Whether histograms created by the registry start out enabled.
    pub enabled: bool,
    /// Maximum samples retained per histogram before the oldest are
    /// discarded.
    pub max_samples: usize,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl InstrumentConfig {
    /// Create a configuration with default retention.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    /// Create a configuration with collection disabled.
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Set the per-histogram sample retention cap.
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }
}
