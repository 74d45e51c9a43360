//! Fault reporting for storage failures.
//!
//! Persistence faults never propagate into the tab registry. They are handed
//! to a `FaultReporter` instead; the default one logs them.

use parking_lot::Mutex;
use std::error::Error;

/// Receives errors that were caught and swallowed by the persistence layer.
pub trait FaultReporter: Send + Sync {
    /// `context` names the operation that failed (e.g. "hydrate", "persist").
    fn report(&self, context: &str, error: &dyn Error);
}

/// Reports faults through the `log` facade at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFaultReporter;

impl FaultReporter for LogFaultReporter {
    fn report(&self, context: &str, error: &dyn Error) {
        log::error!("Chat tabs {} failed: {}", context, error);
    }
}

/// Keeps reported faults in memory, for inspection by embedders and tests
#[derive(Debug, Default)]
pub struct CollectingFaultReporter {
    faults: Mutex<Vec<(String, String)>>,
}

impl CollectingFaultReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(context, message)` pairs in the order they were reported
    pub fn faults(&self) -> Vec<(String, String)> {
        self.faults.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.faults.lock().is_empty()
    }
}

impl FaultReporter for CollectingFaultReporter {
    fn report(&self, context: &str, error: &dyn Error) {
        log::debug!("Collected {} fault: {}", context, error);
        self.faults
            .lock()
            .push((context.to_string(), error.to_string()));
    }
}
