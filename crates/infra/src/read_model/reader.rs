use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use thiserror::Error;

use stockfold_core::StreamId;
use stockfold_inventory::streams::{FLAT_READ_MODEL, OVERVIEW_READ_MODEL, flat_stream_for};
use stockfold_inventory::{FlatItemState, OverviewState};

use crate::event_store::{EventStore, EventStoreError};

#[derive(Debug, Error)]
pub enum ReadModelError {
    #[error("event store error: {0}")]
    Store(#[from] EventStoreError),

    #[error("unreadable read model in '{stream_id}': {source}")]
    Decode {
        stream_id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Queries the derived read-model streams written by the projection hosts.
///
/// Every fact in a derived stream carries the full state, so the newest fact
/// is the current read model.
#[derive(Debug)]
pub struct ReadModelReader<S> {
    store: S,
    page_size: usize,
}

impl<S> ReadModelReader<S>
where
    S: EventStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            page_size: 1_000,
        }
    }

    /// Newest snapshot in `stream_id`, decoded as `T`.
    pub fn latest<T: DeserializeOwned>(&self, stream_id: &StreamId) -> Result<Option<T>, ReadModelError> {
        let stream = self.store.load_stream(stream_id)?;
        stream
            .last()
            .map(|fact| decode(stream_id.as_str(), fact.body().clone()))
            .transpose()
    }

    /// Current read model of one item, given its `InventoryItem-<id>` stream.
    pub fn item(&self, item_stream: &StreamId) -> Result<Option<FlatItemState>, ReadModelError> {
        self.latest(&StreamId::new(flat_stream_for(item_stream)))
    }

    /// Category-wide total; the initial state when nothing was emitted yet.
    pub fn overview(&self) -> Result<OverviewState, ReadModelError> {
        Ok(self
            .latest(&StreamId::new(OVERVIEW_READ_MODEL))?
            .unwrap_or_default())
    }

    /// Current read model of every item, keyed by derived stream id.
    pub fn items(&self) -> Result<BTreeMap<String, FlatItemState>, ReadModelError> {
        let mut latest = BTreeMap::new();
        let mut after = None;

        loop {
            let page = self.store.read_category(FLAT_READ_MODEL, after, self.page_size)?;
            let Some(last) = page.last() else {
                break;
            };
            after = Some(last.position());

            for fact in &page {
                latest.insert(fact.stream_id().to_string(), fact.body().clone());
            }
            if page.len() < self.page_size {
                break;
            }
        }

        latest
            .into_iter()
            .map(|(stream_id, body)| {
                let state: FlatItemState = decode(&stream_id, body)?;
                Ok::<_, ReadModelError>((stream_id, state))
            })
            .collect()
    }
}

fn decode<T: DeserializeOwned>(stream_id: &str, body: serde_json::Value) -> Result<T, ReadModelError> {
    serde_json::from_value(body).map_err(|source| ReadModelError::Decode {
        stream_id: stream_id.to_owned(),
        source,
    })
}
