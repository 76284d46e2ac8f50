//! Inventory item domain: the write model and its read-model projections.
//!
//! - [`item`]: the event-sourced `InventoryItem` aggregate
//! - [`flat`]: per-item read model (`InventoryItemFlatReadModel-<id>`)
//! - [`overview`]: category-wide total (`InventoryItemOverviewReadModel`)
//!
//! Everything here is deterministic domain logic (no IO, no storage).

pub mod flat;
pub mod item;
pub mod item_event;
pub mod overview;
pub mod streams;

pub use flat::{FlatItemState, FlatReadModelProjection};
pub use item::{
    CheckInItemsToInventory, CreateInventoryItem, DeactivateInventoryItem, InventoryCommand,
    InventoryEvent, InventoryItem, InventoryItemId, ItemCreated, ItemDeactivated, ItemRenamed,
    ItemsCheckedIn, ItemsRemoved, RemoveItemsFromInventory, RenameInventoryItem,
};
pub use item_event::{ItemEvent, QuantityChange};
pub use overview::{OverviewReadModelProjection, OverviewState};
pub use streams::{FLAT_READ_MODEL, ITEM_CATEGORY, OVERVIEW_READ_MODEL};
