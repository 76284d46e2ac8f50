//! Logging setup shared by the binaries.

/// Initialize process-wide logging from the environment.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    logging::init();
}

/// Subscriber configuration (format, filters).
pub mod logging;

pub use logging::{LogFormat, ParseLogFormatError};
