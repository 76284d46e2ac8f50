//! Query side of the derived read-model streams.

pub mod reader;

pub use reader::{ReadModelError, ReadModelReader};
