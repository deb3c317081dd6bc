//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate the database and the upstream client.

mod performance;
mod sync;

pub use performance::PerformanceService;
pub use sync::{PreparedBatch, QuarantinedRecord, SyncOutcome, SyncService, prepare_batch};
