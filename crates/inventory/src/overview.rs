//! Category-wide ("overview") read model: net quantity over every item.
//!
//! The state is shared by all `InventoryItem-*` streams and follows the
//! store's global order. Only quantity events are handled.

use serde::{Deserialize, Serialize};

use stockfold_events::{
    EmittedEvent, EventEnvelope, Partitioning, Projection, ProjectionError, Reduction,
};

use crate::item_event::ItemEvent;
use crate::streams::{ITEM_CATEGORY, OVERVIEW_READ_MODEL, overview_event_type};

/// `total` becomes `None` (`null`) for good after an unreadable `Count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewState {
    pub total: Option<i64>,
}

impl Default for OverviewState {
    fn default() -> Self {
        Self { total: Some(0) }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OverviewReadModelProjection;

impl OverviewReadModelProjection {
    pub fn new() -> Self {
        Self
    }
}

impl Projection for OverviewReadModelProjection {
    type State = OverviewState;

    fn name(&self) -> &str {
        OVERVIEW_READ_MODEL
    }

    fn source_category(&self) -> &str {
        ITEM_CATEGORY
    }

    fn partitioning(&self) -> Partitioning {
        Partitioning::Category
    }

    fn init(&self) -> OverviewState {
        OverviewState::default()
    }

    fn reduce(
        &self,
        mut state: OverviewState,
        event: &EventEnvelope,
    ) -> Result<Reduction<OverviewState>, ProjectionError> {
        let Some(change) = ItemEvent::parse(event).quantity_change() else {
            return Ok(Reduction::ignored(state));
        };
        state.total = change.apply_to(state.total);

        let fact = EmittedEvent::snapshot(
            OVERVIEW_READ_MODEL,
            overview_event_type(event.event_type()),
            &state,
        )?;
        Ok(Reduction::emitted(state, fact))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;
    use serde_json::{Value as JsonValue, json};
    use stockfold_core::StreamId;
    use stockfold_events::{DiscardEmitter, ProjectionRunner};
    use uuid::Uuid;

    use super::*;

    fn recorded(stream: &str, event_type: &str, body: JsonValue, position: u64) -> EventEnvelope {
        EventEnvelope::new(
            Uuid::now_v7(),
            StreamId::new(stream),
            event_type,
            position,
            position,
            Utc::now(),
            body,
        )
    }

    fn total_of(events: &[EventEnvelope]) -> Option<i64> {
        let runner = ProjectionRunner::rebuild_from_scratch(
            OverviewReadModelProjection::new(),
            events,
            &mut DiscardEmitter,
        )
        .unwrap();
        runner
            .state(ITEM_CATEGORY)
            .map_or(Some(0), |s| s.total)
    }

    #[test]
    fn widget_example_totals_three() {
        let events = [
            recorded("InventoryItem-42", "Created", json!({ "Name": "Widget" }), 1),
            recorded("InventoryItem-42", "ItemsCheckedIn", json!({ "Count": 5 }), 2),
            recorded("InventoryItem-42", "ItemsRemoved", json!({ "Count": 2 }), 3),
        ];

        let mut out = Vec::new();
        let runner = ProjectionRunner::rebuild_from_scratch(
            OverviewReadModelProjection::new(),
            &events,
            &mut out,
        )
        .unwrap();

        assert_eq!(runner.state(ITEM_CATEGORY), Some(&OverviewState { total: Some(3) }));

        // Created is not handled by the overview.
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|f| f.stream_id == "InventoryItemOverviewReadModel"));
        assert_eq!(out[0].event_type, "ItemsCheckedIn_InventoryItemOverviewReadModel");
        assert_eq!(out[1].event_type, "ItemsRemoved_InventoryItemOverviewReadModel");
        assert_eq!(out[1].body, json!({ "total": 3 }));
    }

    #[test]
    fn totals_span_all_item_streams() {
        let events = [
            recorded("InventoryItem-a", "ItemsCheckedIn", json!({ "Count": 10 }), 1),
            recorded("InventoryItem-b", "ItemsCheckedIn", json!({ "Count": 4 }), 2),
            recorded("InventoryItem-a", "ItemsRemoved", json!({ "Count": 3 }), 3),
            recorded("InventoryItem-b", "Renamed", json!({ "Name": "x" }), 4),
        ];

        assert_eq!(total_of(&events), Some(11));
    }

    #[test]
    fn unreadable_count_nulls_the_total() {
        let events = [
            recorded("InventoryItem-a", "ItemsCheckedIn", json!({ "Count": 10 }), 1),
            recorded("InventoryItem-b", "ItemsRemoved", json!({ "Count": null }), 2),
            recorded("InventoryItem-a", "ItemsCheckedIn", json!({ "Count": 4 }), 3),
        ];

        let mut out = Vec::new();
        let runner = ProjectionRunner::rebuild_from_scratch(
            OverviewReadModelProjection::new(),
            &events,
            &mut out,
        )
        .unwrap();

        assert_eq!(runner.state(ITEM_CATEGORY), Some(&OverviewState { total: None }));
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].body, json!({ "total": 10 }));
        assert_eq!(out[1].body, json!({ "total": null }));
        assert_eq!(out[2].body, json!({ "total": null }));
    }

    #[test]
    fn non_quantity_events_emit_nothing() {
        let events = [
            recorded("InventoryItem-a", "Created", json!({ "Name": "Widget" }), 1),
            recorded("InventoryItem-a", "Deactivated", json!({}), 2),
            recorded("InventoryItem-a", "Audited", json!({}), 3),
        ];

        let mut out = Vec::new();
        ProjectionRunner::rebuild_from_scratch(OverviewReadModelProjection::new(), &events, &mut out)
            .unwrap();

        assert!(out.is_empty());
    }

    /// Per-stream quantity deltas for up to four item streams.
    fn streams() -> impl Strategy<Value = Vec<Vec<i64>>> {
        prop::collection::vec(prop::collection::vec(-500i64..500, 0..15), 1..5)
    }

    fn to_event(stream: usize, delta: i64, position: u64) -> EventEnvelope {
        let (event_type, count) = if delta >= 0 {
            ("ItemsCheckedIn", delta)
        } else {
            ("ItemsRemoved", -delta)
        };
        recorded(
            &format!("InventoryItem-{stream}"),
            event_type,
            json!({ "Count": count }),
            position,
        )
    }

    /// Interleave streams following `order` (a shuffled list of stream indexes),
    /// keeping each stream's own order.
    fn interleave(streams: &[Vec<i64>], order: &[usize]) -> Vec<EventEnvelope> {
        let mut cursors = vec![0usize; streams.len()];
        order
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let delta = streams[s][cursors[s]];
                cursors[s] += 1;
                to_event(s, delta, i as u64 + 1)
            })
            .collect()
    }

    fn tags(streams: &[Vec<i64>]) -> Vec<usize> {
        streams
            .iter()
            .enumerate()
            .flat_map(|(i, s)| std::iter::repeat(i).take(s.len()))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the total is the sum of all deltas, whatever the interleaving
        /// of independent item streams.
        #[test]
        fn total_is_invariant_under_interleaving(
            (streams, order) in streams().prop_flat_map(|s| {
                let order = Just(tags(&s)).prop_shuffle();
                (Just(s), order)
            })
        ) {
            let expected: i64 = streams.iter().flatten().sum();

            let sequential = interleave(&streams, &tags(&streams));
            let shuffled = interleave(&streams, &order);

            prop_assert_eq!(total_of(&sequential), Some(expected));
            prop_assert_eq!(total_of(&shuffled), Some(expected));
        }
    }
}
