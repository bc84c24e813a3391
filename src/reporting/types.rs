use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, GpsFix};
use crate::geofence::CheckpointKind;
use crate::roster::WorkerId;
use crate::telemetry::generate_correlation_id;

/// A geofence containment failure at a transition checkpoint.
/// Immutable once created; one record per failed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub correlation_id: String,
    pub task_id: u64,
    /// Pickup location the check ran against; `None` for the dropoff.
    pub location_id: Option<u32>,
    pub kind: CheckpointKind,
    pub actual_fix: GpsFix,
    pub expected_center: GeoPoint,
    pub distance_meters: f64,
    pub required_meters: f64,
    pub recorded_at: DateTime<Utc>,
    /// Dropoff violations page an admin; pickup and start-route
    /// violations only reach the supervisor dashboard.
    pub notify_admin: bool,
}

impl ViolationRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        task_id: u64,
        location_id: Option<u32>,
        kind: CheckpointKind,
        actual_fix: GpsFix,
        expected_center: GeoPoint,
        distance_meters: f64,
        required_meters: f64,
        notify_admin: bool,
    ) -> Self {
        Self {
            correlation_id: generate_correlation_id(),
            task_id,
            location_id,
            kind,
            actual_fix,
            expected_center,
            distance_meters,
            required_meters,
            recorded_at: Utc::now(),
            notify_admin,
        }
    }
}

/// A roster discrepancy found while confirming a pickup or dropoff.
/// Informational: the trip proceeds, supervisors get the warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchRecord {
    pub correlation_id: String,
    pub task_id: u64,
    /// Pickup location the roster belongs to; `None` for the
    /// end-of-trip manifest check at dropoff.
    pub location_id: Option<u32>,
    pub expected_count: usize,
    pub actual_count: usize,
    pub missing_workers: Vec<WorkerId>,
    pub recorded_at: DateTime<Utc>,
}

impl MismatchRecord {
    pub fn new(
        task_id: u64,
        location_id: Option<u32>,
        expected_count: usize,
        actual_count: usize,
        missing_workers: Vec<WorkerId>,
    ) -> Self {
        Self {
            correlation_id: generate_correlation_id(),
            task_id,
            location_id,
            expected_count,
            actual_count,
            missing_workers,
            recorded_at: Utc::now(),
        }
    }
}
