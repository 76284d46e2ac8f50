//! Projection hosting (read model builders).
//!
//! Projections themselves are pure (see `stockfold-inventory`); this module
//! runs them against a store. Hosted projections are:
//! - **Rebuildable**: reset the checkpoint and replay the category
//! - **Resumable**: state and position are checkpointed
//! - **Idempotent**: redelivered events at or below the checkpoint are skipped

pub mod checkpoint;
pub mod host;

pub use checkpoint::{CheckpointError, CheckpointStore, InMemoryCheckpointStore};
pub use host::{CatchUpReport, HostError, ProjectionHost};
