use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use stockfold_core::StreamId;

/// A recorded event: stream metadata plus an untyped JSON body.
///
/// This is the unit a projection consumes.
///
/// Notes:
/// - **Append-only**: `stream_revision` is 1-based and increases by one per stream.
/// - `position` is the 1-based slot in the store's global log; it gives the
///   total order used when a projection reads a whole category.
/// - `body` is not validated; projections read the fields they care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    event_id: Uuid,
    stream_id: StreamId,
    event_type: String,

    /// Position inside `stream_id`.
    stream_revision: u64,

    /// Position in the global log.
    position: u64,

    recorded_at: DateTime<Utc>,

    body: JsonValue,
}

impl EventEnvelope {
    pub fn new(
        event_id: Uuid,
        stream_id: StreamId,
        event_type: impl Into<String>,
        stream_revision: u64,
        position: u64,
        recorded_at: DateTime<Utc>,
        body: JsonValue,
    ) -> Self {
        Self {
            event_id,
            stream_id,
            event_type: event_type.into(),
            stream_revision,
            position,
            recorded_at,
            body,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn stream_revision(&self) -> u64 {
        self.stream_revision
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn body(&self) -> &JsonValue {
        &self.body
    }
}
