//! Transport task data model.
//!
//! A task is one driver's scheduled trip: an ordered list of pickup
//! locations followed by a single dropoff, carrying a worker manifest.
//! Tasks are created by the dispatch backend in `Pending` and mutated
//! only through [`DispatchStateMachine`](super::DispatchStateMachine)
//! operations; archival happens upstream.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::GeofenceZone;
use crate::roster::WorkerId;

/// Trip lifecycle status. Strictly linear; `Completed` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    EnRoutePickup,
    PickupComplete,
    EnRouteDropoff,
    Completed,
}

/// The dispatch backend sent a status code this build does not know.
/// Surfaced instead of silently falling back to `Pending`, so schema
/// drift between backend and app shows up at the integration boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized backend status code {code:?}")]
pub struct UnknownStatusCode {
    pub code: String,
}

impl TaskStatus {
    /// Maps the backend's wire codes onto the typed status. Exhaustive:
    /// anything unrecognized is an error, never a default.
    pub fn from_backend_code(code: &str) -> Result<Self, UnknownStatusCode> {
        match code {
            "PLANNED" => Ok(TaskStatus::Pending),
            "EN_ROUTE_PICKUP" => Ok(TaskStatus::EnRoutePickup),
            "PICKUP_COMPLETE" => Ok(TaskStatus::PickupComplete),
            "EN_ROUTE_DROPOFF" => Ok(TaskStatus::EnRouteDropoff),
            "COMPLETED" => Ok(TaskStatus::Completed),
            other => Err(UnknownStatusCode {
                code: other.to_string(),
            }),
        }
    }

    pub fn backend_code(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PLANNED",
            TaskStatus::EnRoutePickup => "EN_ROUTE_PICKUP",
            TaskStatus::PickupComplete => "PICKUP_COMPLETE",
            TaskStatus::EnRouteDropoff => "EN_ROUTE_DROPOFF",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    /// The single legal next status, or `None` from the terminal state.
    pub fn successor(&self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Pending => Some(TaskStatus::EnRoutePickup),
            TaskStatus::EnRoutePickup => Some(TaskStatus::PickupComplete),
            TaskStatus::PickupComplete => Some(TaskStatus::EnRouteDropoff),
            TaskStatus::EnRouteDropoff => Some(TaskStatus::Completed),
            TaskStatus::Completed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::EnRoutePickup => "en_route_pickup",
            TaskStatus::PickupComplete => "pickup_complete",
            TaskStatus::EnRouteDropoff => "en_route_dropoff",
            TaskStatus::Completed => "completed",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task {task_id} has no pickup locations")]
    EmptyPickupList { task_id: u64 },
    #[error("task {task_id} declares location id {location_id} more than once")]
    DuplicateLocationId { task_id: u64, location_id: u32 },
}

/// One stop on the pickup leg. `actual_pickup_time` is the
/// authoritative "this stop is done" signal; it is stamped exactly
/// once, when the stop's pickup is confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupLocation {
    pub(crate) location_id: u32,
    pub(crate) geofence: GeofenceZone,
    pub(crate) expected_workers: BTreeSet<WorkerId>,
    pub(crate) checked_in_workers: BTreeSet<WorkerId>,
    pub(crate) actual_pickup_time: Option<DateTime<Utc>>,
}

impl PickupLocation {
    pub fn new(
        location_id: u32,
        geofence: GeofenceZone,
        expected_workers: BTreeSet<WorkerId>,
    ) -> Self {
        Self {
            location_id,
            geofence,
            expected_workers,
            checked_in_workers: BTreeSet::new(),
            actual_pickup_time: None,
        }
    }

    pub fn location_id(&self) -> u32 {
        self.location_id
    }

    pub fn geofence(&self) -> &GeofenceZone {
        &self.geofence
    }

    pub fn expected_workers(&self) -> &BTreeSet<WorkerId> {
        &self.expected_workers
    }

    pub fn checked_in_workers(&self) -> &BTreeSet<WorkerId> {
        &self.checked_in_workers
    }

    pub fn actual_pickup_time(&self) -> Option<DateTime<Utc>> {
        self.actual_pickup_time
    }

    pub fn is_complete(&self) -> bool {
        self.actual_pickup_time.is_some()
    }
}

/// The trip's single destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropoffLocation {
    pub(crate) geofence: GeofenceZone,
    pub(crate) actual_arrival: Option<DateTime<Utc>>,
}

impl DropoffLocation {
    pub fn new(geofence: GeofenceZone) -> Self {
        Self {
            geofence,
            actual_arrival: None,
        }
    }

    pub fn geofence(&self) -> &GeofenceZone {
        &self.geofence
    }

    pub fn actual_arrival(&self) -> Option<DateTime<Utc>> {
        self.actual_arrival
    }
}

/// One driver's trip with its manifest and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportTask {
    pub(crate) task_id: u64,
    pub(crate) pickup_locations: Vec<PickupLocation>,
    pub(crate) dropoff: DropoffLocation,
    pub(crate) status: TaskStatus,
    pub(crate) total_workers: u32,
    pub(crate) checked_in_workers: u32,
}

impl TransportTask {
    /// Builds a task in `Pending`. The pickup list must be non-empty
    /// with unique location ids; `total_workers` is the size of the
    /// combined expected roster.
    pub fn new(
        task_id: u64,
        pickup_locations: Vec<PickupLocation>,
        dropoff: DropoffLocation,
    ) -> Result<Self, TaskError> {
        if pickup_locations.is_empty() {
            return Err(TaskError::EmptyPickupList { task_id });
        }
        let mut seen = BTreeSet::new();
        for location in &pickup_locations {
            if !seen.insert(location.location_id) {
                return Err(TaskError::DuplicateLocationId {
                    task_id,
                    location_id: location.location_id,
                });
            }
        }
        let total_workers = pickup_locations
            .iter()
            .map(|p| p.expected_workers.len() as u32)
            .sum();
        Ok(Self {
            task_id,
            pickup_locations,
            dropoff,
            status: TaskStatus::Pending,
            total_workers,
            checked_in_workers: 0,
        })
    }

    pub fn task_id(&self) -> u64 {
        self.task_id
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn total_workers(&self) -> u32 {
        self.total_workers
    }

    pub fn checked_in_workers(&self) -> u32 {
        self.checked_in_workers
    }

    pub fn pickup_locations(&self) -> &[PickupLocation] {
        &self.pickup_locations
    }

    pub fn dropoff(&self) -> &DropoffLocation {
        &self.dropoff
    }

    pub fn pickup(&self, location_id: u32) -> Option<&PickupLocation> {
        self.pickup_locations
            .iter()
            .find(|p| p.location_id == location_id)
    }

    pub fn all_pickups_complete(&self) -> bool {
        self.pickup_locations.iter().all(PickupLocation::is_complete)
    }

    /// Everyone checked in anywhere on the trip, for the end-of-trip
    /// manifest check.
    pub fn checked_in_union(&self) -> BTreeSet<WorkerId> {
        self.pickup_locations
            .iter()
            .flat_map(|p| p.checked_in_workers.iter().copied())
            .collect()
    }

    pub(crate) fn recount_checked_in(&mut self) {
        self.checked_in_workers = self
            .pickup_locations
            .iter()
            .map(|p| p.checked_in_workers.len() as u32)
            .sum();
    }
}
