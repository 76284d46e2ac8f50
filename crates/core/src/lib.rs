//! `stockfold-core`: shared building blocks for the inventory read models.
//!
//! This crate contains **pure** primitives (no IO, no storage): stream identity,
//! concurrency expectations and the domain error model.

pub mod aggregate;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::DomainError;
pub use id::{AggregateId, StreamId, CATEGORY_SEPARATOR};
