//! Batch ingest orchestration
//!
//! Everything here is orchestration over the real components: the processor
//! produces records and warnings, the gate judges the finished batch, the
//! store lands it. See [`coordinator::IngestCoordinator`] for the flow.

pub mod batch;
pub mod coordinator;
pub mod summary;

pub use batch::Batch;
pub use coordinator::{IngestCoordinator, IngestOptions};
pub use summary::IngestSummary;
