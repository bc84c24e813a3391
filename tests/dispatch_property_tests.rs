//! Property-based tests for the distance math, roster reconciliation,
//! and the transition legality matrix.
//! Testing library/framework: proptest over the public API.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use crew_dispatch::{
    distance_meters, reconcile, DispatchStateMachine, DropoffLocation, GeoPoint, GeofenceZone,
    InMemoryMismatchSink, InMemoryViolationSink, PickupLocation, RosterCheck, TaskStatus,
    TransportTask, WorkerId,
};

const ALL_STATUSES: [TaskStatus; 5] = [
    TaskStatus::Pending,
    TaskStatus::EnRoutePickup,
    TaskStatus::PickupComplete,
    TaskStatus::EnRouteDropoff,
    TaskStatus::Completed,
];

fn geo_point() -> impl Strategy<Value = GeoPoint> {
    (-90.0f64..=90.0, -180.0f64..=180.0)
        .prop_map(|(lat, lon)| GeoPoint::new(lat, lon).unwrap())
}

fn worker_set() -> impl Strategy<Value = BTreeSet<WorkerId>> {
    proptest::collection::btree_set((0u64..500).prop_map(WorkerId), 0..20)
}

fn status() -> impl Strategy<Value = TaskStatus> {
    proptest::sample::select(ALL_STATUSES.to_vec())
}

fn machine() -> DispatchStateMachine {
    DispatchStateMachine::new(
        Arc::new(InMemoryViolationSink::new()),
        Arc::new(InMemoryMismatchSink::new()),
    )
}

fn task() -> TransportTask {
    let zone = GeofenceZone::new(GeoPoint::new(1.30, 103.80).unwrap(), 100.0, "site").unwrap();
    TransportTask::new(
        9,
        vec![PickupLocation::new(1, zone.clone(), BTreeSet::new())],
        DropoffLocation::new(zone),
    )
    .unwrap()
}

/// Walk a fresh task to `target` through the manual override path.
fn task_at(machine: &mut DispatchStateMachine, target: TaskStatus) -> TransportTask {
    let mut task = task();
    while task.status() != target {
        let next = task.status().successor().expect("walk past terminal");
        machine.update_status(&mut task, next).unwrap();
    }
    task
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in geo_point(), b in geo_point()) {
        let ab = distance_meters(a, b);
        let ba = distance_meters(b, a);
        prop_assert!((ab - ba).abs() < 1e-6, "ab={ab} ba={ba}");
    }

    #[test]
    fn distance_to_self_is_zero(a in geo_point()) {
        prop_assert_eq!(distance_meters(a, a), 0.0);
    }

    #[test]
    fn distance_is_finite_and_bounded(a in geo_point(), b in geo_point()) {
        let d = distance_meters(a, b);
        prop_assert!(d.is_finite());
        // Nothing is farther apart than half the circumference.
        prop_assert!((0.0..=20_015_200.0).contains(&d), "d={d}");
    }

    #[test]
    fn zone_contains_its_boundary(a in geo_point(), b in geo_point()) {
        let d = distance_meters(a, b);
        prop_assume!(d > 0.0);
        // Radius set to the exact distance: inclusive boundary.
        let zone = GeofenceZone::new(b, d, "edge").unwrap();
        let (within, reported) = zone.contains(a);
        prop_assert!(within);
        prop_assert_eq!(reported, d);
    }

    #[test]
    fn superset_check_in_always_matches(expected in worker_set(), extras in worker_set()) {
        let actual: BTreeSet<WorkerId> = expected.union(&extras).copied().collect();
        prop_assert!(reconcile(&expected, &actual).is_match());
    }

    #[test]
    fn reconcile_reports_exactly_the_set_difference(
        expected in worker_set(),
        actual in worker_set(),
    ) {
        let want_missing: Vec<WorkerId> = expected.difference(&actual).copied().collect();
        match reconcile(&expected, &actual) {
            RosterCheck::Match => prop_assert!(want_missing.is_empty()),
            RosterCheck::Mismatch { expected_count, actual_count, missing } => {
                prop_assert!(!want_missing.is_empty());
                prop_assert_eq!(missing, want_missing);
                prop_assert_eq!(expected_count, expected.len());
                prop_assert_eq!(actual_count, actual.len());
            }
        }
    }

    #[test]
    fn status_never_moves_backward_or_skips(from in status(), to in status()) {
        let mut m = machine();
        let mut task = task_at(&mut m, from);

        let result = m.update_status(&mut task, to);
        if to == from {
            // Duplicate assertion of the current status is absorbed.
            let outcome = result.unwrap();
            prop_assert!(outcome.replayed);
            prop_assert_eq!(task.status(), from);
        } else if from.successor() == Some(to) {
            let outcome = result.unwrap();
            prop_assert!(!outcome.replayed);
            prop_assert_eq!(outcome.status, to);
            prop_assert_eq!(task.status(), to);
        } else {
            prop_assert!(result.is_err());
            // Rejected transitions leave the task untouched.
            prop_assert_eq!(task.status(), from);
        }
    }
}
