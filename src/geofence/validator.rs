use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::geo::{GeofenceZone, GpsFix};
use crate::reporting::{ViolationRecord, ViolationSink};

use super::policy::{CheckpointKind, RadiusPolicy};

/// Why a containment check did not pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    /// No fix was available. The caller blocks the transition and asks
    /// the driver to retry once location comes back; no violation is
    /// recorded because the driver's position is simply unknown.
    #[error("no GPS fix available")]
    GpsUnavailable,
    /// The fix is outside the allowed radius. A violation record has
    /// already been emitted; the driver can move and retry.
    #[error("fix is {distance_meters:.1}m from the zone center, allowed {required_meters:.0}m")]
    OutsideGeofence {
        distance_meters: f64,
        required_meters: f64,
    },
}

/// Identifies which task and checkpoint a validation belongs to, so
/// violation records land with enough context to act on.
#[derive(Debug, Clone, Copy)]
pub struct CheckpointContext {
    pub task_id: u64,
    /// Pickup location under check; `None` at the dropoff.
    pub location_id: Option<u32>,
    pub kind: CheckpointKind,
}

/// Runs containment checks against the radius policy and reports
/// failures to the injected violation sink.
pub struct GeofenceValidator {
    policy: RadiusPolicy,
    violations: Arc<dyn ViolationSink>,
    accuracy_warning_meters: Option<f64>,
}

impl GeofenceValidator {
    pub fn new(violations: Arc<dyn ViolationSink>) -> Self {
        Self {
            policy: RadiusPolicy::default(),
            violations,
            accuracy_warning_meters: None,
        }
    }

    /// Log a warning for fixes whose reported accuracy is worse than
    /// `meters`. Advisory only; never changes the pass/fail outcome.
    pub fn with_accuracy_warning(mut self, meters: f64) -> Self {
        self.accuracy_warning_meters = Some(meters);
        self
    }

    pub fn policy(&self) -> &RadiusPolicy {
        &self.policy
    }

    /// Checks the fix against the zone at the radius the checkpoint
    /// kind allows. Returns the measured distance on a pass. On a
    /// containment failure a violation record goes to the sink, with
    /// `notify_admin` set for dropoff checkpoints.
    pub fn validate(
        &self,
        fix: Option<&GpsFix>,
        zone: &GeofenceZone,
        ctx: &CheckpointContext,
    ) -> Result<f64, ValidationFailure> {
        let Some(fix) = fix else {
            warn!(
                task_id = %ctx.task_id,
                location_id = ?ctx.location_id,
                checkpoint = %ctx.kind,
                "Containment check blocked: no GPS fix"
            );
            return Err(ValidationFailure::GpsUnavailable);
        };

        if let Some(threshold) = self.accuracy_warning_meters {
            if fix.accuracy_meters > threshold {
                warn!(
                    task_id = %ctx.task_id,
                    accuracy_meters = %fix.accuracy_meters,
                    threshold_meters = %threshold,
                    "GPS fix accuracy is poor"
                );
            }
        }

        let required_meters = self.policy.required_meters(ctx.kind);
        let distance_meters = crate::geo::distance_meters(fix.point, zone.center());

        if distance_meters > required_meters {
            let notify_admin = ctx.kind == CheckpointKind::DropoffComplete;
            warn!(
                task_id = %ctx.task_id,
                location_id = ?ctx.location_id,
                checkpoint = %ctx.kind,
                zone = %zone.label(),
                distance_meters = %distance_meters,
                required_meters = %required_meters,
                notify_admin = %notify_admin,
                "Geofence violation"
            );
            self.violations.record(ViolationRecord::new(
                ctx.task_id,
                ctx.location_id,
                ctx.kind,
                fix.clone(),
                zone.center(),
                distance_meters,
                required_meters,
                notify_admin,
            ));
            return Err(ValidationFailure::OutsideGeofence {
                distance_meters,
                required_meters,
            });
        }

        debug!(
            task_id = %ctx.task_id,
            location_id = ?ctx.location_id,
            checkpoint = %ctx.kind,
            distance_meters = %distance_meters,
            "Containment check passed"
        );
        Ok(distance_meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::reporting::InMemoryViolationSink;
    use chrono::Utc;

    fn fix_at(lat: f64, lon: f64) -> GpsFix {
        GpsFix::new(GeoPoint::new(lat, lon).unwrap(), 5.0, Utc::now()).unwrap()
    }

    fn zone_at(lat: f64, lon: f64, radius: f64) -> GeofenceZone {
        GeofenceZone::new(GeoPoint::new(lat, lon).unwrap(), radius, "test zone").unwrap()
    }

    fn ctx(kind: CheckpointKind) -> CheckpointContext {
        CheckpointContext {
            task_id: 10,
            location_id: Some(1),
            kind,
        }
    }

    #[test]
    fn test_pass_returns_distance_and_emits_nothing() {
        let sink = Arc::new(InMemoryViolationSink::new());
        let validator = GeofenceValidator::new(sink.clone());
        let zone = zone_at(1.30, 103.80, 100.0);

        let distance = validator
            .validate(Some(&fix_at(1.30, 103.80)), &zone, &ctx(CheckpointKind::PickupComplete))
            .unwrap();
        assert_eq!(distance, 0.0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_missing_fix_blocks_without_violation() {
        let sink = Arc::new(InMemoryViolationSink::new());
        let validator = GeofenceValidator::new(sink.clone());
        let zone = zone_at(1.30, 103.80, 100.0);

        let err = validator
            .validate(None, &zone, &ctx(CheckpointKind::StartRoute))
            .unwrap_err();
        assert_eq!(err, ValidationFailure::GpsUnavailable);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_out_of_range_fix_emits_violation() {
        let sink = Arc::new(InMemoryViolationSink::new());
        let validator = GeofenceValidator::new(sink.clone());
        let zone = zone_at(1.30, 103.80, 100.0);

        // ~500m north of the zone center.
        let err = validator
            .validate(
                Some(&fix_at(1.3045, 103.80)),
                &zone,
                &ctx(CheckpointKind::PickupComplete),
            )
            .unwrap_err();
        match err {
            ValidationFailure::OutsideGeofence {
                distance_meters,
                required_meters,
            } => {
                assert!((distance_meters - 500.4).abs() < 5.0);
                assert_eq!(required_meters, 100.0);
            }
            other => panic!("unexpected failure: {other:?}"),
        }

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].task_id, 10);
        assert_eq!(records[0].location_id, Some(1));
        assert!(!records[0].notify_admin);
    }

    #[test]
    fn test_dropoff_violation_notifies_admin() {
        let sink = Arc::new(InMemoryViolationSink::new());
        let validator = GeofenceValidator::new(sink.clone());
        let zone = zone_at(1.30, 103.80, 100.0);

        let ctx = CheckpointContext {
            task_id: 10,
            location_id: None,
            kind: CheckpointKind::DropoffComplete,
        };
        assert!(validator
            .validate(Some(&fix_at(1.31, 103.80)), &zone, &ctx)
            .is_err());

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].notify_admin);
        assert_eq!(records[0].location_id, None);
    }

    #[test]
    fn test_start_route_uses_wider_radius() {
        let sink = Arc::new(InMemoryViolationSink::new());
        let validator = GeofenceValidator::new(sink.clone());
        let zone = zone_at(1.30, 103.80, 100.0);

        // ~122m out: outside the 100m pickup radius, inside the 150m
        // start-route radius.
        let fix = fix_at(1.3011, 103.80);
        assert!(validator
            .validate(Some(&fix), &zone, &ctx(CheckpointKind::StartRoute))
            .is_ok());
        assert!(validator
            .validate(Some(&fix), &zone, &ctx(CheckpointKind::PickupComplete))
            .is_err());
        assert_eq!(sink.len(), 1);
    }
}
