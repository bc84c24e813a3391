//! Worker roster reconciliation.
//!
//! Compares the workers a pickup location expected against the workers
//! actually checked in. Missing workers are reported. Workers beyond
//! the expected set are tolerated without comment: site supervisors
//! routinely add unplanned labour to a trip.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Badge number of a worker in the workforce registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct WorkerId(pub u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// Outcome of comparing an expected roster against actual check-ins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterCheck {
    /// Every expected worker is accounted for.
    Match,
    /// One or more expected workers did not check in.
    Mismatch {
        expected_count: usize,
        actual_count: usize,
        missing: Vec<WorkerId>,
    },
}

impl RosterCheck {
    pub fn is_match(&self) -> bool {
        matches!(self, RosterCheck::Match)
    }

    pub fn missing(&self) -> &[WorkerId] {
        match self {
            RosterCheck::Match => &[],
            RosterCheck::Mismatch { missing, .. } => missing,
        }
    }
}

/// Pure set difference: workers in `expected` but not in `actual` are
/// missing. Stateless; callers decide what to do with a mismatch.
pub fn reconcile(expected: &BTreeSet<WorkerId>, actual: &BTreeSet<WorkerId>) -> RosterCheck {
    let missing: Vec<WorkerId> = expected.difference(actual).copied().collect();
    if missing.is_empty() {
        RosterCheck::Match
    } else {
        RosterCheck::Mismatch {
            expected_count: expected.len(),
            actual_count: actual.len(),
            missing,
        }
    }
}
