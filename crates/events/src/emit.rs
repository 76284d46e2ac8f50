//! Derived facts produced by projections and the sink they are handed to.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// A derived fact: a full read-model snapshot addressed to a target stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmittedEvent {
    pub stream_id: String,
    pub event_type: String,
    pub body: JsonValue,
}

impl EmittedEvent {
    pub fn new(stream_id: impl Into<String>, event_type: impl Into<String>, body: JsonValue) -> Self {
        Self {
            stream_id: stream_id.into(),
            event_type: event_type.into(),
            body,
        }
    }

    /// Build a fact whose body is the serialized `state`.
    pub fn snapshot<S: Serialize>(
        stream_id: impl Into<String>,
        event_type: impl Into<String>,
        state: &S,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(stream_id, event_type, serde_json::to_value(state)?))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to emit to '{stream_id}': {reason}")]
pub struct EmitError {
    pub stream_id: String,
    pub reason: String,
}

impl EmitError {
    pub fn new(stream_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            reason: reason.into(),
        }
    }
}

/// Output side of a projection: `emit(target_stream_id, event_type, payload)`.
///
/// Hosts implement this to index derived facts as new streams.
pub trait Emitter {
    fn emit(
        &mut self,
        target_stream_id: &str,
        event_type: &str,
        payload: &JsonValue,
    ) -> Result<(), EmitError>;
}

/// Collects facts in memory (tests, dry runs).
impl Emitter for Vec<EmittedEvent> {
    fn emit(
        &mut self,
        target_stream_id: &str,
        event_type: &str,
        payload: &JsonValue,
    ) -> Result<(), EmitError> {
        self.push(EmittedEvent::new(target_stream_id, event_type, payload.clone()));
        Ok(())
    }
}

impl<E> Emitter for &mut E
where
    E: Emitter + ?Sized,
{
    fn emit(
        &mut self,
        target_stream_id: &str,
        event_type: &str,
        payload: &JsonValue,
    ) -> Result<(), EmitError> {
        (**self).emit(target_stream_id, event_type, payload)
    }
}

/// Discards every fact (rebuilding state without re-emitting).
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardEmitter;

impl Emitter for DiscardEmitter {
    fn emit(&mut self, _: &str, _: &str, _: &JsonValue) -> Result<(), EmitError> {
        Ok(())
    }
}
