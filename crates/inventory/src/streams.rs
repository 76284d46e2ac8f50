//! Stream and event-type naming shared by the write model and the read models.
//!
//! These strings are a compatibility contract with existing stores; they are
//! not configurable.

use stockfold_core::StreamId;

/// Category of the item write-model streams.
pub const ITEM_CATEGORY: &str = "InventoryItem";

/// Prefix removed from an item stream id to obtain the item suffix.
pub const ITEM_STREAM_PREFIX: &str = "InventoryItem-";

/// Read-model category of the per-item projection.
pub const FLAT_READ_MODEL: &str = "InventoryItemFlatReadModel";

/// Read-model category (and single stream) of the category-wide projection.
pub const OVERVIEW_READ_MODEL: &str = "InventoryItemOverviewReadModel";

/// Derived stream for one item: `InventoryItemFlatReadModel-<suffix>`.
///
/// Only the first occurrence of [`ITEM_STREAM_PREFIX`] is removed.
pub fn flat_stream_for(source: &StreamId) -> String {
    format!(
        "{FLAT_READ_MODEL}-{}",
        source.as_str().replacen(ITEM_STREAM_PREFIX, "", 1)
    )
}

pub fn flat_event_type(source_event_type: &str) -> String {
    format!("{source_event_type}_{FLAT_READ_MODEL}")
}

pub fn overview_event_type(source_event_type: &str) -> String {
    format!("{source_event_type}_{OVERVIEW_READ_MODEL}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_stream_keeps_item_suffix() {
        let source = StreamId::new("InventoryItem-42");
        assert_eq!(flat_stream_for(&source), "InventoryItemFlatReadModel-42");
    }

    #[test]
    fn flat_stream_removes_prefix_once() {
        let source = StreamId::new("InventoryItem-InventoryItem-7");
        assert_eq!(
            flat_stream_for(&source),
            "InventoryItemFlatReadModel-InventoryItem-7"
        );
    }

    #[test]
    fn event_types_are_suffixed_with_read_model() {
        assert_eq!(flat_event_type("Created"), "Created_InventoryItemFlatReadModel");
        assert_eq!(
            overview_event_type("ItemsRemoved"),
            "ItemsRemoved_InventoryItemOverviewReadModel"
        );
    }
}
