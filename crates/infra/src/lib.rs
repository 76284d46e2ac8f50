//! Infrastructure layer: event store, projection hosting, read-model queries, config.

pub mod command_dispatcher;
pub mod config;
pub mod event_store;
pub mod projections;
pub mod read_model;


pub use command_dispatcher::{CommandDispatcher, DispatchError};
pub use config::{ConfigError, HostConfig};
