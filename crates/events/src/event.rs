use serde_json::Value as JsonValue;

/// A typed domain event that can be recorded in a stream.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - designed to be **append-only**
///
/// The store only sees the `event_type` name and the JSON `body`, so both
/// must stay stable for existing streams to replay.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event type name as written to the stream (e.g. "ItemsCheckedIn").
    fn event_type(&self) -> &'static str;

    /// JSON body as written to the stream.
    fn body(&self) -> Result<JsonValue, serde_json::Error>;
}
