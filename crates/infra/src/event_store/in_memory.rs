use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use stockfold_core::{ExpectedVersion, StreamId};
use stockfold_events::EventEnvelope;

use super::r#trait::{EventStore, EventStoreError, UncommittedEvent};

#[derive(Debug, Default)]
struct Log {
    streams: HashMap<StreamId, Vec<EventEnvelope>>,
    /// Global log; `all[i].position() == i + 1`.
    all: Vec<EventEnvelope>,
}

/// In-memory append-only event store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    log: RwLock<Log>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the newest event in the store (if any).
    pub fn head_position(&self) -> Result<Option<u64>, EventStoreError> {
        let log = self.log.read().map_err(|_| EventStoreError::Poisoned)?;
        Ok(log.all.last().map(EventEnvelope::position))
    }
}

impl EventStore for InMemoryEventStore {
    fn append(
        &self,
        stream_id: &StreamId,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<EventEnvelope>, EventStoreError> {
        if events.is_empty() {
            return Ok(vec![]);
        }

        for (idx, e) in events.iter().enumerate() {
            if e.event_type.is_empty() {
                return Err(EventStoreError::InvalidAppend(format!(
                    "event at index {idx} has an empty event type"
                )));
            }
        }

        let mut log = self.log.write().map_err(|_| EventStoreError::Poisoned)?;
        let Log { streams, all } = &mut *log;

        let current = streams.get(stream_id).map_or(0, |s| s.len() as u64);
        if !expected_version.matches(current) {
            return Err(EventStoreError::Concurrency(format!(
                "stream '{stream_id}': expected {expected_version:?}, found {current}"
            )));
        }

        let stream = streams.entry(stream_id.clone()).or_default();

        let recorded_at = Utc::now();
        let mut committed = Vec::with_capacity(events.len());
        for (offset, e) in events.into_iter().enumerate() {
            let envelope = EventEnvelope::new(
                e.event_id,
                stream_id.clone(),
                e.event_type,
                current + offset as u64 + 1,
                all.len() as u64 + 1,
                recorded_at,
                e.body,
            );
            stream.push(envelope.clone());
            all.push(envelope.clone());
            committed.push(envelope);
        }

        Ok(committed)
    }

    fn load_stream(&self, stream_id: &StreamId) -> Result<Vec<EventEnvelope>, EventStoreError> {
        let log = self.log.read().map_err(|_| EventStoreError::Poisoned)?;
        Ok(log.streams.get(stream_id).cloned().unwrap_or_default())
    }

    fn read_category(
        &self,
        category: &str,
        after: Option<u64>,
        limit: usize,
    ) -> Result<Vec<EventEnvelope>, EventStoreError> {
        let log = self.log.read().map_err(|_| EventStoreError::Poisoned)?;
        let start = after.map_or(0, |p| p as usize);

        Ok(log
            .all
            .iter()
            .skip(start)
            .filter(|e| e.stream_id().is_in_category(category))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ev(event_type: &str) -> UncommittedEvent {
        UncommittedEvent::new(event_type, json!({}))
    }

    #[test]
    fn append_assigns_revisions_and_global_positions() {
        let store = InMemoryEventStore::new();
        let a = StreamId::new("InventoryItem-a");
        let b = StreamId::new("InventoryItem-b");

        store.append(&a, vec![ev("Created"), ev("Renamed")], ExpectedVersion::Exact(0)).unwrap();
        let committed = store.append(&b, vec![ev("Created")], ExpectedVersion::Any).unwrap();

        assert_eq!(committed[0].stream_revision(), 1);
        assert_eq!(committed[0].position(), 3);

        let loaded = store.load_stream(&a).unwrap();
        assert_eq!(
            loaded.iter().map(|e| e.stream_revision()).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(store.head_position().unwrap(), Some(3));
    }

    #[test]
    fn stale_expected_version_is_rejected() {
        let store = InMemoryEventStore::new();
        let a = StreamId::new("InventoryItem-a");
        store.append(&a, vec![ev("Created")], ExpectedVersion::Exact(0)).unwrap();

        let err = store.append(&a, vec![ev("Renamed")], ExpectedVersion::Exact(0)).unwrap_err();
        assert!(matches!(err, EventStoreError::Concurrency(_)));
        assert_eq!(store.load_stream(&a).unwrap().len(), 1);
    }

    #[test]
    fn rejected_append_leaves_no_stream_behind() {
        let store = InMemoryEventStore::new();
        let a = StreamId::new("InventoryItem-a");

        let err = store.append(&a, vec![ev("Renamed")], ExpectedVersion::Exact(3)).unwrap_err();
        assert!(matches!(err, EventStoreError::Concurrency(_)));

        let log = store.log.read().unwrap();
        assert!(!log.streams.contains_key(&a));
        assert!(log.all.is_empty());
    }

    #[test]
    fn empty_event_type_is_rejected() {
        let store = InMemoryEventStore::new();
        let err = store
            .append(&StreamId::new("InventoryItem-a"), vec![ev("")], ExpectedVersion::Any)
            .unwrap_err();
        assert!(matches!(err, EventStoreError::InvalidAppend(_)));
    }

    #[test]
    fn read_category_filters_and_pages_in_global_order() {
        let store = InMemoryEventStore::new();
        store.append(&StreamId::new("InventoryItem-a"), vec![ev("Created")], ExpectedVersion::Any).unwrap();
        store
            .append(&StreamId::new("InventoryItemFlatReadModel-a"), vec![ev("Created_X")], ExpectedVersion::Any)
            .unwrap();
        store.append(&StreamId::new("InventoryItem-b"), vec![ev("Created")], ExpectedVersion::Any).unwrap();
        store.append(&StreamId::new("InventoryItem-a"), vec![ev("Renamed")], ExpectedVersion::Any).unwrap();

        let first = store.read_category("InventoryItem", None, 2).unwrap();
        assert_eq!(first.iter().map(|e| e.position()).collect::<Vec<_>>(), vec![1, 3]);

        let rest = store.read_category("InventoryItem", Some(3), 10).unwrap();
        assert_eq!(rest.iter().map(|e| e.position()).collect::<Vec<_>>(), vec![4]);

        assert!(store.read_category("InventoryItem", Some(4), 10).unwrap().is_empty());
    }
}
