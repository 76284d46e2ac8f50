use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use stockfold_core::{ExpectedVersion, StreamId};
use stockfold_events::{Event, EventEnvelope};
use std::sync::Arc;

/// An event ready to be appended to a stream (not yet assigned a position).
///
/// The store assigns the stream revision, the global position and the
/// recording time during append, producing an [`EventEnvelope`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    pub event_id: Uuid,
    pub event_type: String,
    pub body: JsonValue,
}

impl UncommittedEvent {
    pub fn new(event_type: impl Into<String>, body: JsonValue) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event_type.into(),
            body,
        }
    }

    /// Convenience constructor from a typed domain event.
    pub fn from_typed<E>(event: &E) -> Result<Self, EventStoreError>
    where
        E: Event,
    {
        let body = event
            .body()
            .map_err(|e| EventStoreError::InvalidAppend(format!("body serialization failed: {e}")))?;
        Ok(Self::new(event.event_type(), body))
    }
}

/// Event store operation error.
///
/// These are **infrastructure errors** (storage, concurrency) as opposed to
/// domain errors (validation, invariants).
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("event store lock poisoned")]
    Poisoned,
}

/// Append-only store of named streams with a global log.
///
/// ## Streams and categories
///
/// Every stream belongs to the category named by its id prefix (see
/// [`StreamId::category`]). Within a stream, revisions run 1, 2, 3, ...
/// Across the whole store every event also gets a global position, and
/// [`read_category`](EventStore::read_category) yields a category's events in
/// that order. This total order is what category-wide projections fold over,
/// so it must be stable across reads.
///
/// ## Append semantics
///
/// - Checks `expected_version` against the current revision (0 = empty stream)
/// - Assigns revisions and positions contiguously
/// - All events in one call are appended or none are
pub trait EventStore: Send + Sync {
    fn append(
        &self,
        stream_id: &StreamId,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<EventEnvelope>, EventStoreError>;

    /// Load a full stream in revision order (empty if it does not exist).
    fn load_stream(&self, stream_id: &StreamId) -> Result<Vec<EventEnvelope>, EventStoreError>;

    /// Read up to `limit` events of `category` with a global position after
    /// `after` (from the beginning when `None`), in position order.
    fn read_category(
        &self,
        category: &str,
        after: Option<u64>,
        limit: usize,
    ) -> Result<Vec<EventEnvelope>, EventStoreError>;
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn append(
        &self,
        stream_id: &StreamId,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<EventEnvelope>, EventStoreError> {
        (**self).append(stream_id, events, expected_version)
    }

    fn load_stream(&self, stream_id: &StreamId) -> Result<Vec<EventEnvelope>, EventStoreError> {
        (**self).load_stream(stream_id)
    }

    fn read_category(
        &self,
        category: &str,
        after: Option<u64>,
        limit: usize,
    ) -> Result<Vec<EventEnvelope>, EventStoreError> {
        (**self).read_category(category, after, limit)
    }
}

impl<S> EventStore for &S
where
    S: EventStore + ?Sized,
{
    fn append(
        &self,
        stream_id: &StreamId,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<EventEnvelope>, EventStoreError> {
        (**self).append(stream_id, events, expected_version)
    }

    fn load_stream(&self, stream_id: &StreamId) -> Result<Vec<EventEnvelope>, EventStoreError> {
        (**self).load_stream(stream_id)
    }

    fn read_category(
        &self,
        category: &str,
        after: Option<u64>,
        limit: usize,
    ) -> Result<Vec<EventEnvelope>, EventStoreError> {
        (**self).read_category(category, after, limit)
    }
}
