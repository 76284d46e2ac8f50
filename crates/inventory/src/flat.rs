//! Per-item ("flat") read model.
//!
//! One state per `InventoryItem-<id>` stream. Every handled event re-emits the
//! whole state to `InventoryItemFlatReadModel-<id>`.

use serde::{Deserialize, Serialize};

use stockfold_events::{
    EmittedEvent, EventEnvelope, Partitioning, Projection, ProjectionError, Reduction,
};

use crate::item_event::ItemEvent;
use crate::streams::{FLAT_READ_MODEL, ITEM_CATEGORY, flat_event_type, flat_stream_for};

/// Read model of one inventory item.
///
/// `count` becomes `None` (`null`) once any quantity event carries an
/// unreadable `Count`, and stays so for the rest of the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatItemState {
    pub name: Option<String>,
    pub count: Option<i64>,
    pub active: bool,
    pub count_changes: u64,
}

impl Default for FlatItemState {
    fn default() -> Self {
        Self {
            name: None,
            count: Some(0),
            active: false,
            count_changes: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlatReadModelProjection;

impl FlatReadModelProjection {
    pub fn new() -> Self {
        Self
    }
}

impl Projection for FlatReadModelProjection {
    type State = FlatItemState;

    fn name(&self) -> &str {
        FLAT_READ_MODEL
    }

    fn source_category(&self) -> &str {
        ITEM_CATEGORY
    }

    fn partitioning(&self) -> Partitioning {
        Partitioning::PerStream
    }

    fn init(&self) -> FlatItemState {
        FlatItemState::default()
    }

    fn reduce(
        &self,
        mut state: FlatItemState,
        event: &EventEnvelope,
    ) -> Result<Reduction<FlatItemState>, ProjectionError> {
        let parsed = ItemEvent::parse(event);
        if let Some(change) = parsed.quantity_change() {
            state.count = change.apply_to(state.count);
            state.count_changes += 1;
        }

        match parsed {
            ItemEvent::Created { name } => {
                state.name = name;
                state.active = true;
            }
            ItemEvent::Deactivated => state.active = false,
            ItemEvent::Renamed { name } => state.name = name,
            ItemEvent::ItemsCheckedIn { .. } | ItemEvent::ItemsRemoved { .. } => {}
            ItemEvent::Other(_) => return Ok(Reduction::ignored(state)),
        }

        let fact = EmittedEvent::snapshot(
            flat_stream_for(event.stream_id()),
            flat_event_type(event.event_type()),
            &state,
        )?;
        Ok(Reduction::emitted(state, fact))
    }
}
