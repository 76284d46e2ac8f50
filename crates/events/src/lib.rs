//! `stockfold-events`: event and projection mechanics (domain-agnostic).
//!
//! - [`EventEnvelope`]: a recorded event as a projection sees it
//! - [`Event`]: typed domain events that can be recorded
//! - [`Projection`]: a pure reducer from events to read-model state
//! - [`ProjectionRunner`]: host-side fold with per-key state and a checkpoint
//! - [`Emitter`]: where derived facts go

pub mod emit;
pub mod envelope;
pub mod event;
pub mod projection;
pub mod runner;

pub use emit::{DiscardEmitter, EmitError, EmittedEvent, Emitter};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use projection::{Partitioning, Projection, ProjectionError, Reduction};
pub use runner::{Applied, ProjectionRunner, RunnerSnapshot};
