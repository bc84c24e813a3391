//! Sink traits for outbound records, with in-memory reference
//! implementations.
//!
//! The production application wires these to its persistence and
//! notification backend. The in-memory variants back the test suites
//! and embedders that batch-forward records on their own cadence.

use std::sync::Mutex;

use super::types::{MismatchRecord, ViolationRecord};

/// Receives geofence violation records for storage and alerting.
pub trait ViolationSink: Send + Sync {
    fn record(&self, violation: ViolationRecord);
}

/// Receives roster mismatch records for supervisor warnings.
pub trait MismatchSink: Send + Sync {
    fn record(&self, mismatch: MismatchRecord);
}

/// Mutex-guarded buffer of violation records.
#[derive(Debug, Default)]
pub struct InMemoryViolationSink {
    records: Mutex<Vec<ViolationRecord>>,
}

impl InMemoryViolationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ViolationRecord> {
        self.records.lock().expect("violation sink lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("violation sink lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes every buffered record, leaving the sink empty.
    pub fn drain(&self) -> Vec<ViolationRecord> {
        std::mem::take(&mut *self.records.lock().expect("violation sink lock poisoned"))
    }
}

impl ViolationSink for InMemoryViolationSink {
    fn record(&self, violation: ViolationRecord) {
        self.records
            .lock()
            .expect("violation sink lock poisoned")
            .push(violation);
    }
}

/// Mutex-guarded buffer of mismatch records.
#[derive(Debug, Default)]
pub struct InMemoryMismatchSink {
    records: Mutex<Vec<MismatchRecord>>,
}

impl InMemoryMismatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<MismatchRecord> {
        self.records.lock().expect("mismatch sink lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("mismatch sink lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn drain(&self) -> Vec<MismatchRecord> {
        std::mem::take(&mut *self.records.lock().expect("mismatch sink lock poisoned"))
    }
}

impl MismatchSink for InMemoryMismatchSink {
    fn record(&self, mismatch: MismatchRecord) {
        self.records
            .lock()
            .expect("mismatch sink lock poisoned")
            .push(mismatch);
    }
}
