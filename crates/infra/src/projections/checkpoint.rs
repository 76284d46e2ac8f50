//! Projection checkpoint persistence.
//!
//! A checkpoint is the serialized runner snapshot (last global position plus
//! every partition's state) stored under the projection's name. It enables:
//! - Resume after restart (continue after the last folded position)
//! - Deterministic rebuilds (clear the checkpoint and replay from scratch)

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint store lock poisoned")]
    Poisoned,
}

/// Projection checkpoint store.
pub trait CheckpointStore: Send + Sync {
    /// Last saved snapshot for `projection`, if any.
    fn load(&self, projection: &str) -> Result<Option<JsonValue>, CheckpointError>;

    /// Replace the snapshot for `projection`.
    fn save(&self, projection: &str, snapshot: JsonValue) -> Result<(), CheckpointError>;

    /// Forget `projection`'s checkpoint (for rebuilds).
    fn clear(&self, projection: &str) -> Result<(), CheckpointError>;
}

impl<S> CheckpointStore for Arc<S>
where
    S: CheckpointStore + ?Sized,
{
    fn load(&self, projection: &str) -> Result<Option<JsonValue>, CheckpointError> {
        (**self).load(projection)
    }

    fn save(&self, projection: &str, snapshot: JsonValue) -> Result<(), CheckpointError> {
        (**self).save(projection, snapshot)
    }

    fn clear(&self, projection: &str) -> Result<(), CheckpointError> {
        (**self).clear(projection)
    }
}

/// In-memory checkpoint store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCheckpointStore {
    inner: RwLock<HashMap<String, JsonValue>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CheckpointStore for InMemoryCheckpointStore {
    fn load(&self, projection: &str) -> Result<Option<JsonValue>, CheckpointError> {
        let map = self.inner.read().map_err(|_| CheckpointError::Poisoned)?;
        Ok(map.get(projection).cloned())
    }

    fn save(&self, projection: &str, snapshot: JsonValue) -> Result<(), CheckpointError> {
        let mut map = self.inner.write().map_err(|_| CheckpointError::Poisoned)?;
        map.insert(projection.to_owned(), snapshot);
        Ok(())
    }

    fn clear(&self, projection: &str) -> Result<(), CheckpointError> {
        let mut map = self.inner.write().map_err(|_| CheckpointError::Poisoned)?;
        map.remove(projection);
        Ok(())
    }
}
