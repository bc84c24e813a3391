//! Per-checkpoint radius policy.
//!
//! The allowed distance from a zone center depends on which checkpoint
//! the driver is confirming, not on the zone itself: starting a route
//! tolerates 150 m (drivers stage outside the yard gate), while pickup
//! and dropoff confirmations require 100 m. The numbers are operational
//! constants agreed with site management, so they live in one table
//! here rather than at call sites.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which location-gated operation the containment check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointKind {
    StartRoute,
    PickupComplete,
    DropoffComplete,
}

impl fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckpointKind::StartRoute => "start_route",
            CheckpointKind::PickupComplete => "pickup_complete",
            CheckpointKind::DropoffComplete => "dropoff_complete",
        };
        write!(f, "{}", label)
    }
}

pub const START_ROUTE_RADIUS_METERS: f64 = 150.0;
pub const PICKUP_RADIUS_METERS: f64 = 100.0;
pub const DROPOFF_RADIUS_METERS: f64 = 100.0;

/// The radius table consulted for every containment check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusPolicy {
    pub start_route_meters: f64,
    pub pickup_meters: f64,
    pub dropoff_meters: f64,
}

impl Default for RadiusPolicy {
    fn default() -> Self {
        Self {
            start_route_meters: START_ROUTE_RADIUS_METERS,
            pickup_meters: PICKUP_RADIUS_METERS,
            dropoff_meters: DROPOFF_RADIUS_METERS,
        }
    }
}

impl RadiusPolicy {
    pub fn required_meters(&self, kind: CheckpointKind) -> f64 {
        match kind {
            CheckpointKind::StartRoute => self.start_route_meters,
            CheckpointKind::PickupComplete => self.pickup_meters,
            CheckpointKind::DropoffComplete => self.dropoff_meters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_radii() {
        let policy = RadiusPolicy::default();
        assert_eq!(policy.required_meters(CheckpointKind::StartRoute), 150.0);
        assert_eq!(policy.required_meters(CheckpointKind::PickupComplete), 100.0);
        assert_eq!(policy.required_meters(CheckpointKind::DropoffComplete), 100.0);
    }

    #[test]
    fn test_checkpoint_kind_display() {
        assert_eq!(CheckpointKind::StartRoute.to_string(), "start_route");
        assert_eq!(CheckpointKind::PickupComplete.to_string(), "pickup_complete");
        assert_eq!(CheckpointKind::DropoffComplete.to_string(), "dropoff_complete");
    }
}
