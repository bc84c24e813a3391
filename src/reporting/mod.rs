// Reporting Module - outbound violation and mismatch records
//
// The dispatch core never persists or notifies on its own. Everything
// it has to say to the backend goes through the sink traits defined
// here, so the embedding application chooses storage and alerting.

pub mod sinks;
pub mod types;

pub use sinks::{InMemoryMismatchSink, InMemoryViolationSink, MismatchSink, ViolationSink};
pub use types::{MismatchRecord, ViolationRecord};
