//! Startup readiness probe.
//!
//! Confirms the database answers before the process starts depending on it,
//! retrying with a fixed delay to ride out slow database startup under
//! container orchestration.

mod liveness;
mod policy;
mod probe;

pub use liveness::LivenessCheck;
pub use policy::RetryPolicy;
pub use probe::{connect_with_retry, ProbeState, ProbeSuccess, StartupProber};
