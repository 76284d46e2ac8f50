//! Command execution pipeline for inventory items.
//!
//! ```text
//! Command
//!   ↓
//! 1. Load the item's stream
//!   ↓
//! 2. Rehydrate the aggregate
//!   ↓
//! 3. Handle command (pure decision logic, produces events)
//!   ↓
//! 4. Append events (optimistic concurrency on the loaded revision)
//! ```
//!
//! Projections pick the appended events up from the category; the dispatcher
//! does not talk to them.

use thiserror::Error;
use tracing::debug;

use stockfold_core::{Aggregate, AggregateRoot, DomainError, ExpectedVersion};
use stockfold_events::EventEnvelope;
use stockfold_inventory::{InventoryCommand, InventoryItem};

use crate::event_store::{EventStore, EventStoreError, UncommittedEvent};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The command was rejected by the aggregate.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Loading or appending failed (including concurrency conflicts).
    #[error(transparent)]
    Store(#[from] EventStoreError),
}

#[derive(Debug)]
pub struct CommandDispatcher<S> {
    store: S,
}

impl<S> CommandDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> CommandDispatcher<S>
where
    S: EventStore,
{
    /// Run one command against its item and return the recorded events.
    pub fn dispatch(&self, command: &InventoryCommand) -> Result<Vec<EventEnvelope>, DispatchError> {
        let item_id = command.item_id();
        let stream_id = item_id.stream_id();

        let history = self.store.load_stream(&stream_id)?;
        let item = InventoryItem::load(item_id, &history)?;

        let events = item.handle(command)?;
        let uncommitted = events
            .iter()
            .map(UncommittedEvent::from_typed)
            .collect::<Result<Vec<_>, _>>()?;

        let committed = self
            .store
            .append(&stream_id, uncommitted, ExpectedVersion::Exact(item.version()))?;

        debug!(
            stream_id = %stream_id,
            appended = committed.len(),
            "inventory command dispatched"
        );
        Ok(committed)
    }
}
