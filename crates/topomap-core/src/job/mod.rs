// ── Jobs ──
//
// Cancellable background jobs built on a shared controller. Each job owns
// its inputs, reports progress through its handle, and hands back a typed
// output when it finishes.

pub mod controller;
pub mod discovery;
pub mod mapping;
pub mod scan;

pub use controller::{Job, JobController, JobHandle, JobState, JobStatus};
pub use discovery::Discovery;
pub use mapping::{TopologyMappingJob, TopologyMappingOutput};
pub use scan::{ScanMappingJob, ScanMappingOutput};
