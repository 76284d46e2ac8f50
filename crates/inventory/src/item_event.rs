//! Read-side view of item events.
//!
//! Unlike [`InventoryEvent`](crate::InventoryEvent), decoding never fails:
//! fields that are missing or of the wrong type come through as absent, and
//! any unknown event type lands in [`ItemEvent::Other`].

use serde_json::Value as JsonValue;

use stockfold_events::EventEnvelope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEvent<'a> {
    Created { name: Option<String> },
    Deactivated,
    Renamed { name: Option<String> },
    ItemsCheckedIn { count: Option<i64> },
    ItemsRemoved { count: Option<i64> },
    Other(&'a str),
}

impl<'a> ItemEvent<'a> {
    pub fn parse(event: &'a EventEnvelope) -> Self {
        let body = event.body();
        match event.event_type() {
            "Created" => Self::Created { name: name_of(body) },
            "Deactivated" => Self::Deactivated,
            "Renamed" => Self::Renamed { name: name_of(body) },
            "ItemsCheckedIn" => Self::ItemsCheckedIn { count: count_of(body) },
            "ItemsRemoved" => Self::ItemsRemoved { count: count_of(body) },
            other => Self::Other(other),
        }
    }

    /// Change to the item quantity, if this event affects it.
    pub fn quantity_change(&self) -> Option<QuantityChange> {
        let change = match self {
            Self::ItemsCheckedIn { count } => count.map_or(QuantityChange::Unreadable, QuantityChange::Delta),
            Self::ItemsRemoved { count } => count.map_or(QuantityChange::Unreadable, |c| {
                QuantityChange::Delta(c.saturating_neg())
            }),
            _ => return None,
        };
        Some(change)
    }
}

/// Signed quantity carried by a quantity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Delta(i64),
    /// `Count` was missing or not an integer.
    Unreadable,
}

impl QuantityChange {
    /// Apply to a running quantity.
    ///
    /// An unreadable change poisons the quantity: it stays `None` (serialized
    /// as `null`) for every later event.
    pub fn apply_to(self, current: Option<i64>) -> Option<i64> {
        match self {
            Self::Delta(delta) => current.map(|c| c.saturating_add(delta)),
            Self::Unreadable => None,
        }
    }
}

fn name_of(body: &JsonValue) -> Option<String> {
    body.get("Name").and_then(JsonValue::as_str).map(str::to_owned)
}

/// Integer `Count`; integral floats such as `5.0` are accepted too.
fn count_of(body: &JsonValue) -> Option<i64> {
    let count = body.get("Count")?;
    count.as_i64().or_else(|| {
        count
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}
