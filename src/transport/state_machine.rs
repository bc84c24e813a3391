//! The transport task state machine.
//!
//! Every status change funnels through here. Each operation checks the
//! current status, runs the geofence gate for its checkpoint, applies
//! the mutation, and returns the resulting status, or a typed error
//! with the task untouched. Geofence failures are retryable (the
//! driver moves and taps again); roster mismatches are informational
//! and never block; illegal transitions are caller bugs and are logged
//! at error level before being rejected.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::geo::GpsFix;
use crate::geofence::{CheckpointContext, CheckpointKind, GeofenceValidator, ValidationFailure};
use crate::reporting::{MismatchRecord, MismatchSink, ViolationSink};
use crate::roster::{reconcile, RosterCheck, WorkerId};

use super::types::{TaskStatus, TransportTask};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    /// The requested move is not on the legal edge set. Indicates a
    /// UI or caller defect, not a runtime condition.
    #[error("transition {from} -> {to} is not allowed")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },
    /// The caller named a pickup location the task does not have.
    #[error("task {task_id} has no pickup location {location_id}")]
    UnknownLocation { task_id: u64, location_id: u32 },
    /// The geofence gate did not pass; see the inner failure for
    /// whether a fix was missing or out of range.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

/// What a successful operation did.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// Task status after the operation.
    pub status: TaskStatus,
    /// Workers the roster check found missing, when one ran and came
    /// up short. The transition completed regardless.
    pub missing_workers: Vec<WorkerId>,
    /// True when the call duplicated an already-applied confirmation
    /// and was absorbed as a no-op.
    pub replayed: bool,
}

impl TransitionOutcome {
    fn advanced(status: TaskStatus) -> Self {
        Self {
            status,
            missing_workers: Vec::new(),
            replayed: false,
        }
    }

    fn replay(status: TaskStatus) -> Self {
        Self {
            status,
            missing_workers: Vec::new(),
            replayed: true,
        }
    }
}

/// Which operation caused a status change. Kept in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTrigger {
    StartRoute,
    ConfirmPickup,
    ConfirmDropoff,
    ManualOverride,
}

/// One entry in the machine's status audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangeRecord {
    pub task_id: u64,
    pub from: TaskStatus,
    pub to: TaskStatus,
    pub trigger: TransitionTrigger,
    pub changed_at: DateTime<Utc>,
}

/// Drives transport tasks through their lifecycle. Collaborators are
/// constructor-injected; the machine holds no task state of its own
/// beyond the audit trail, so one instance can serve many tasks.
pub struct DispatchStateMachine {
    validator: GeofenceValidator,
    mismatches: Arc<dyn MismatchSink>,
    history: Vec<StatusChangeRecord>,
}

impl DispatchStateMachine {
    pub fn new(violations: Arc<dyn ViolationSink>, mismatches: Arc<dyn MismatchSink>) -> Self {
        Self {
            validator: GeofenceValidator::new(violations),
            mismatches,
            history: Vec::new(),
        }
    }

    /// Forward the accuracy advisory threshold to the geofence gate.
    pub fn with_accuracy_warning(mut self, meters: f64) -> Self {
        self.validator = self.validator.with_accuracy_warning(meters);
        self
    }

    /// Status changes applied through this machine, oldest first.
    pub fn history(&self) -> &[StatusChangeRecord] {
        &self.history
    }

    /// Begin the trip. Legal only from `Pending`; the driver must be
    /// within the start-route radius of the first pickup location.
    pub fn start_route(
        &mut self,
        task: &mut TransportTask,
        fix: Option<&GpsFix>,
    ) -> Result<TransitionOutcome, TransitionError> {
        if task.status != TaskStatus::Pending {
            return Err(self.illegal(task, TaskStatus::EnRoutePickup));
        }

        // Constructor guarantees at least one pickup location.
        let first = &task.pickup_locations[0];
        let ctx = CheckpointContext {
            task_id: task.task_id,
            location_id: Some(first.location_id),
            kind: CheckpointKind::StartRoute,
        };
        self.validator.validate(fix, &first.geofence, &ctx)?;

        self.apply(task, TaskStatus::EnRoutePickup, TransitionTrigger::StartRoute);
        Ok(TransitionOutcome::advanced(task.status))
    }

    /// Confirm one pickup stop: gate on the stop's geofence, record
    /// who actually boarded, stamp the stop, and reconcile the roster.
    /// A mismatch is reported but never blocks. When the last stop is
    /// stamped the task advances to `PickupComplete`.
    ///
    /// Re-confirming an already-stamped stop is absorbed as a no-op so
    /// a double tap cannot double-count check-ins or re-emit records.
    pub fn confirm_pickup(
        &mut self,
        task: &mut TransportTask,
        location_id: u32,
        fix: Option<&GpsFix>,
        actual_workers: &BTreeSet<WorkerId>,
    ) -> Result<TransitionOutcome, TransitionError> {
        let task_id = task.task_id;
        let Some(index) = task
            .pickup_locations
            .iter()
            .position(|p| p.location_id == location_id)
        else {
            error!(
                task_id = %task_id,
                location_id = %location_id,
                "Pickup confirmation for a location the task does not have"
            );
            return Err(TransitionError::UnknownLocation {
                task_id,
                location_id,
            });
        };

        if task.pickup_locations[index].is_complete() {
            info!(
                task_id = %task_id,
                location_id = %location_id,
                status = %task.status,
                "Duplicate pickup confirmation absorbed"
            );
            return Ok(TransitionOutcome::replay(task.status));
        }

        if task.status != TaskStatus::EnRoutePickup {
            return Err(self.illegal(task, TaskStatus::PickupComplete));
        }

        let ctx = CheckpointContext {
            task_id,
            location_id: Some(location_id),
            kind: CheckpointKind::PickupComplete,
        };
        self.validator
            .validate(fix, &task.pickup_locations[index].geofence, &ctx)?;

        let location = &mut task.pickup_locations[index];
        let expected = location.expected_workers.clone();
        location.checked_in_workers = actual_workers.clone();
        location.actual_pickup_time = Some(Utc::now());
        task.recount_checked_in();

        let check = reconcile(&expected, actual_workers);
        let missing_workers = self.report_mismatch(task_id, Some(location_id), &check);

        info!(
            task_id = %task_id,
            location_id = %location_id,
            checked_in = %actual_workers.len(),
            expected = %expected.len(),
            "Pickup confirmed"
        );

        if task.all_pickups_complete() {
            self.apply(task, TaskStatus::PickupComplete, TransitionTrigger::ConfirmPickup);
        }

        Ok(TransitionOutcome {
            status: task.status,
            missing_workers,
            replayed: false,
        })
    }

    /// Complete the trip at the dropoff zone. Legal from
    /// `PickupComplete` or `EnRouteDropoff`. The end-of-trip manifest
    /// check compares everyone checked in across the pickup stops with
    /// the set actually delivered.
    pub fn confirm_dropoff(
        &mut self,
        task: &mut TransportTask,
        fix: Option<&GpsFix>,
        actual_workers: &BTreeSet<WorkerId>,
    ) -> Result<TransitionOutcome, TransitionError> {
        if !matches!(
            task.status,
            TaskStatus::PickupComplete | TaskStatus::EnRouteDropoff
        ) {
            return Err(self.illegal(task, TaskStatus::Completed));
        }

        let ctx = CheckpointContext {
            task_id: task.task_id,
            location_id: None,
            kind: CheckpointKind::DropoffComplete,
        };
        self.validator.validate(fix, &task.dropoff.geofence, &ctx)?;

        task.dropoff.actual_arrival = Some(Utc::now());

        let expected = task.checked_in_union();
        let check = reconcile(&expected, actual_workers);
        let missing_workers = self.report_mismatch(task.task_id, None, &check);

        self.apply(task, TaskStatus::Completed, TransitionTrigger::ConfirmDropoff);
        info!(
            task_id = %task.task_id,
            delivered = %actual_workers.len(),
            checked_in = %expected.len(),
            "Dropoff confirmed, trip completed"
        );

        Ok(TransitionOutcome {
            status: task.status,
            missing_workers,
            replayed: false,
        })
    }

    /// Manual override used by the dispatch UI for the intermediate
    /// legs that have no checkpoint of their own. Ungated by location,
    /// but still bound to the linear sequence: only the immediate
    /// successor is accepted. Re-asserting the current status is a
    /// no-op so rapid duplicate taps are harmless.
    pub fn update_status(
        &mut self,
        task: &mut TransportTask,
        explicit: TaskStatus,
    ) -> Result<TransitionOutcome, TransitionError> {
        if explicit == task.status {
            return Ok(TransitionOutcome::replay(task.status));
        }
        if task.status.successor() != Some(explicit) {
            return Err(self.illegal(task, explicit));
        }

        warn!(
            task_id = %task.task_id,
            from = %task.status,
            to = %explicit,
            "Manual status override, no location check"
        );
        self.apply(task, explicit, TransitionTrigger::ManualOverride);
        Ok(TransitionOutcome::advanced(task.status))
    }

    fn apply(&mut self, task: &mut TransportTask, to: TaskStatus, trigger: TransitionTrigger) {
        let from = task.status;
        task.status = to;
        info!(
            task_id = %task.task_id,
            from = %from,
            to = %to,
            trigger = ?trigger,
            "Transport task status advanced"
        );
        self.history.push(StatusChangeRecord {
            task_id: task.task_id,
            from,
            to,
            trigger,
            changed_at: Utc::now(),
        });
    }

    fn illegal(&self, task: &TransportTask, to: TaskStatus) -> TransitionError {
        error!(
            task_id = %task.task_id,
            from = %task.status,
            to = %to,
            "Illegal transport task transition rejected"
        );
        TransitionError::InvalidTransition {
            from: task.status,
            to,
        }
    }

    fn report_mismatch(
        &self,
        task_id: u64,
        location_id: Option<u32>,
        check: &RosterCheck,
    ) -> Vec<WorkerId> {
        match check {
            RosterCheck::Match => Vec::new(),
            RosterCheck::Mismatch {
                expected_count,
                actual_count,
                missing,
            } => {
                warn!(
                    task_id = %task_id,
                    location_id = ?location_id,
                    expected = %expected_count,
                    actual = %actual_count,
                    missing = ?missing,
                    "Roster mismatch, trip proceeds"
                );
                self.mismatches.record(MismatchRecord::new(
                    task_id,
                    location_id,
                    *expected_count,
                    *actual_count,
                    missing.clone(),
                ));
                missing.clone()
            }
        }
    }
}
