// Crew Dispatch Library - Workforce Transport Validation Core
// This exposes the geofence, roster, and trip lifecycle components
// for embedding in the dispatch application.

pub mod config;
pub mod geo;
pub mod geofence;
pub mod reporting;
pub mod roster;
pub mod telemetry;
pub mod transport;

// Re-export key types for easy access
pub use config::{config, init_config, CrewDispatchConfig};
pub use geo::{distance_meters, GeoError, GeoPoint, GeofenceZone, GpsFix};
pub use geofence::{
    CheckpointContext, CheckpointKind, GeofenceValidator, RadiusPolicy, ValidationFailure,
};
pub use reporting::{
    InMemoryMismatchSink, InMemoryViolationSink, MismatchRecord, MismatchSink, ViolationRecord,
    ViolationSink,
};
pub use roster::{reconcile, RosterCheck, WorkerId};
pub use telemetry::{
    create_dispatch_span, generate_correlation_id, init_telemetry, shutdown_telemetry,
};
pub use transport::{
    DispatchStateMachine, DropoffLocation, PickupLocation, StatusChangeRecord, TaskError,
    TaskStatus, TransitionError, TransitionOutcome, TransitionTrigger, TransportTask,
    UnknownStatusCode,
};
