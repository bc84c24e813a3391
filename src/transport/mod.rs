// Transport Task Module - location-gated trip lifecycle
//
// Owns the task data model and the state machine that moves a trip
// through pending -> en_route_pickup -> pickup_complete ->
// en_route_dropoff -> completed, gating each step on geofence
// containment and reconciling worker rosters along the way.

pub mod state_machine;
pub mod types;

pub use state_machine::{
    DispatchStateMachine, StatusChangeRecord, TransitionError, TransitionOutcome,
    TransitionTrigger,
};
pub use types::{
    DropoffLocation, PickupLocation, TaskError, TaskStatus, TransportTask, UnknownStatusCode,
};
