// Geofence Module - containment checks at task checkpoints
//
// Wraps the raw distance math with the per-checkpoint radius policy
// and turns containment failures into violation records.

pub mod policy;
pub mod validator;

pub use policy::{CheckpointKind, RadiusPolicy};
pub use validator::{CheckpointContext, GeofenceValidator, ValidationFailure};
