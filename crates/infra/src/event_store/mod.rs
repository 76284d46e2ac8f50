//! Append-only event store boundary.
//!
//! Defines the abstraction projections are fed from (stream append/load and
//! category iteration in global order) plus an in-memory implementation.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use r#trait::{EventStore, EventStoreError, UncommittedEvent};
