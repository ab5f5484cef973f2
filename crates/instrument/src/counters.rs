//! Name-keyed registry of histograms for one execution context.

use crate::config::InstrumentConfig;
use crate::context::ExecutionContext;
use crate::error::{InstrumentError, InstrumentResult};
use crate::histogram::{HistogramSnapshot, TimedHistogram};
use crate::nested::NestedTimedHistogram;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Registry owning the [`ExecutionContext`] and the histograms of one
/// logical execution context.
///
/// Histograms are created once under a unique name and then looked up by
/// name; at most one nested histogram may be designated as the execute
/// histogram, which is the only sink long-task recording attributes to.
#[derive(Debug)]
pub struct Counters {
    config: InstrumentConfig,
    context: Rc<ExecutionContext>,
    timed: RefCell<HashMap<String, Rc<TimedHistogram>>>,
    nested: RefCell<HashMap<String, Rc<NestedTimedHistogram>>>,
    execute: RefCell<Option<Rc<NestedTimedHistogram>>>,
}

impl Counters {
    /// Create a registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(InstrumentConfig::default())
    }

    /// Create a registry with the given configuration and a fresh
    /// tracing-backed context.
    pub fn with_config(config: InstrumentConfig) -> Self {
        Self::with_context(config, Rc::new(ExecutionContext::new()))
    }

    /// Create a registry reporting into an existing context.
    pub fn with_context(config: InstrumentConfig, context: Rc<ExecutionContext>) -> Self {
        Self {
            config,
            context,
            timed: RefCell::new(HashMap::new()),
            nested: RefCell::new(HashMap::new()),
            execute: RefCell::new(None),
        }
    }

    /// The execution context shared by this registry's histograms.
    pub fn context(&self) -> &Rc<ExecutionContext> {
        &self.context
    }

    /// The configuration histograms are created from.
    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    fn check_unregistered(&self, name: &str) -> InstrumentResult<()> {
        if self.timed.borrow().contains_key(name) || self.nested.borrow().contains_key(name) {
            return Err(InstrumentError::DuplicateHistogram(name.to_string()));
        }
        Ok(())
    }

    /// Register a plain (non-nesting) histogram.
    pub fn create_timed(&self, name: &str) -> InstrumentResult<Rc<TimedHistogram>> {
        self.check_unregistered(name)?;
        let hist = Rc::new(TimedHistogram::from_config(name, &self.config));
        self.timed.borrow_mut().insert(name.to_string(), Rc::clone(&hist));
        Ok(hist)
    }

    /// Register a nested-capable histogram.
    pub fn create_nested(&self, name: &str) -> InstrumentResult<Rc<NestedTimedHistogram>> {
        self.create_nested_inner(name, false)
    }

    /// Register the designated execute histogram. At most one per
    /// registry.
    pub fn create_execute(&self, name: &str) -> InstrumentResult<Rc<NestedTimedHistogram>> {
        if let Some(existing) = self.execute.borrow().as_ref() {
            return Err(InstrumentError::ExecuteAlreadyDesignated(
                existing.name().to_string(),
            ));
        }
        let hist = self.create_nested_inner(name, true)?;
        *self.execute.borrow_mut() = Some(Rc::clone(&hist));
        Ok(hist)
    }

    fn create_nested_inner(
        &self,
        name: &str,
        is_execute: bool,
    ) -> InstrumentResult<Rc<NestedTimedHistogram>> {
        self.check_unregistered(name)?;
        let hist = Rc::new(NestedTimedHistogram::with_settings(
            TimedHistogram::from_config(name, &self.config),
            Rc::clone(&self.context),
            is_execute,
        ));
        self.nested.borrow_mut().insert(name.to_string(), Rc::clone(&hist));
        Ok(hist)
    }

    /// Look up a plain histogram by name.
    pub fn timed(&self, name: &str) -> InstrumentResult<Rc<TimedHistogram>> {
        self.timed
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| InstrumentError::UnknownHistogram(name.to_string()))
    }

    /// Look up a nested histogram by name.
    pub fn nested(&self, name: &str) -> InstrumentResult<Rc<NestedTimedHistogram>> {
        self.nested
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| InstrumentError::UnknownHistogram(name.to_string()))
    }

    /// The designated execute histogram, if one has been registered.
    pub fn execute(&self) -> Option<Rc<NestedTimedHistogram>> {
        self.execute.borrow().clone()
    }

    /// Enable or disable every registered histogram. Scopes already live
    /// keep their construction-time snapshot.
    pub fn set_enabled(&self, enabled: bool) {
        for hist in self.timed.borrow().values() {
            hist.set_enabled(enabled);
        }
        for hist in self.nested.borrow().values() {
            hist.set_enabled(enabled);
        }
    }

    /// Snapshot every registered histogram, sorted by name.
    pub fn snapshot_all(&self) -> Vec<HistogramSnapshot> {
        let mut snapshots: Vec<HistogramSnapshot> = self
            .timed
            .borrow()
            .values()
            .map(|hist| hist.snapshot())
            .chain(self.nested.borrow().values().map(|hist| hist.snapshot()))
            .collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    /// Export all snapshots as pretty-printed JSON.
    pub fn export_json(&self) -> InstrumentResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot_all())?)
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scopes::NestedTimerScope;
    use std::time::Duration;

    #[test]
    fn test_create_and_lookup() {
        let counters = Counters::new();
        counters.create_timed("load_time").unwrap();
        counters.create_nested("execute_time").unwrap();

        assert_eq!(counters.timed("load_time").unwrap().name(), "load_time");
        assert_eq!(counters.nested("execute_time").unwrap().name(), "execute_time");
    }

    #[test]
    fn test_unknown_histogram() {
        let counters = Counters::new();
        let err = counters.timed("missing").unwrap_err();
        assert!(matches!(err, InstrumentError::UnknownHistogram(name) if name == "missing"));
    }

    #[test]
    fn test_duplicate_name_rejected_across_kinds() {
        let counters = Counters::new();
        counters.create_timed("load_time").unwrap();

        assert!(matches!(
            counters.create_timed("load_time"),
            Err(InstrumentError::DuplicateHistogram(_))
        ));
        assert!(matches!(
            counters.create_nested("load_time"),
            Err(InstrumentError::DuplicateHistogram(_))
        ));
    }

    #[test]
    fn test_execute_designation() {
        let counters = Counters::new();
        assert!(counters.execute().is_none());

        let execute = counters.create_execute("execute_time").unwrap();
        assert!(execute.is_execute());
        assert_eq!(counters.execute().unwrap().name(), "execute_time");

        // Only one execute histogram per registry.
        let err = counters.create_execute("other_execute").unwrap_err();
        assert!(matches!(err, InstrumentError::ExecuteAlreadyDesignated(name) if name == "execute_time"));
    }

    #[test]
    fn test_execute_is_also_a_regular_nested_histogram() {
        let counters = Counters::new();
        counters.create_execute("execute_time").unwrap();
        assert!(counters.nested("execute_time").is_ok());
    }

    #[test]
    fn test_disabled_config_propagates() {
        let counters = Counters::with_config(InstrumentConfig::disabled());
        let hist = counters.create_nested("execute_time").unwrap();
        assert!(!hist.is_enabled());
        {
            let _scope = NestedTimerScope::new(&hist);
        }
        assert_eq!(hist.sample_count(), 0);
    }

    #[test]
    fn test_set_enabled_flips_all() {
        let counters = Counters::new();
        let timed = counters.create_timed("load_time").unwrap();
        let nested = counters.create_nested("execute_time").unwrap();

        counters.set_enabled(false);
        assert!(!timed.is_enabled());
        assert!(!nested.is_enabled());
    }

    #[test]
    fn test_snapshot_all_sorted_by_name() {
        let counters = Counters::new();
        counters.create_timed("load_time").unwrap();
        counters.create_nested("execute_time").unwrap();
        counters.timed("load_time").unwrap().record(Duration::from_millis(3));

        let snapshots = counters.snapshot_all();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].name, "execute_time");
        assert_eq!(snapshots[1].name, "load_time");
        assert_eq!(snapshots[1].count, 1);
    }

    #[test]
    fn test_export_json() {
        let counters = Counters::new();
        counters.create_timed("load_time").unwrap();

        let json = counters.export_json().unwrap();
        assert!(json.contains("load_time"));
        assert!(json.contains("capturedAt"));
    }
}
