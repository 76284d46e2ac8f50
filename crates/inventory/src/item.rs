use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockfold_core::{Aggregate, AggregateId, AggregateRoot, DomainError, StreamId};
use stockfold_events::{Event, EventEnvelope};

use crate::streams::ITEM_CATEGORY;

/// Inventory item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryItemId(pub AggregateId);

impl InventoryItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    /// Write-model stream of this item: `InventoryItem-<id>`.
    pub fn stream_id(&self) -> StreamId {
        StreamId::for_entity(ITEM_CATEGORY, self)
    }
}

impl core::fmt::Display for InventoryItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: InventoryItem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    id: InventoryItemId,
    name: String,
    active: bool,
    stock: i64,
    version: u64,
    created: bool,
}

impl InventoryItem {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: InventoryItemId) -> Self {
        Self {
            id,
            name: String::new(),
            active: false,
            stock: 0,
            version: 0,
            created: false,
        }
    }

    /// Rehydrate from the recorded events of the item's stream.
    ///
    /// Event types the write model does not know are skipped but still count
    /// towards the version, so it stays equal to the stream revision.
    pub fn load<'a>(
        id: InventoryItemId,
        history: impl IntoIterator<Item = &'a EventEnvelope>,
    ) -> Result<Self, DomainError> {
        let mut item = Self::empty(id);
        for recorded in history {
            let event = InventoryEvent::from_recorded(recorded.event_type(), recorded.body())
                .map_err(|e| {
                    DomainError::invariant(format!(
                        "unreadable '{}' at revision {}: {e}",
                        recorded.event_type(),
                        recorded.stream_revision()
                    ))
                })?;
            match event {
                Some(ev) => item.apply(&ev),
                None => item.version += 1,
            }
        }
        Ok(item)
    }

    pub fn id_typed(&self) -> InventoryItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }
}

impl AggregateRoot for InventoryItem {
    type Id = InventoryItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateInventoryItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInventoryItem {
    pub item_id: InventoryItemId,
    pub name: String,
}

/// Command: RenameInventoryItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameInventoryItem {
    pub item_id: InventoryItemId,
    pub name: String,
}

/// Command: DeactivateInventoryItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivateInventoryItem {
    pub item_id: InventoryItemId,
}

/// Command: CheckInItemsToInventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInItemsToInventory {
    pub item_id: InventoryItemId,
    pub count: i64,
}

/// Command: RemoveItemsFromInventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItemsFromInventory {
    pub item_id: InventoryItemId,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCommand {
    Create(CreateInventoryItem),
    Rename(RenameInventoryItem),
    Deactivate(DeactivateInventoryItem),
    CheckIn(CheckInItemsToInventory),
    Remove(RemoveItemsFromInventory),
}

impl InventoryCommand {
    pub fn item_id(&self) -> InventoryItemId {
        match self {
            InventoryCommand::Create(c) => c.item_id,
            InventoryCommand::Rename(c) => c.item_id,
            InventoryCommand::Deactivate(c) => c.item_id,
            InventoryCommand::CheckIn(c) => c.item_id,
            InventoryCommand::Remove(c) => c.item_id,
        }
    }
}

/// Event body: Created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemCreated {
    pub name: String,
}

/// Event body: Deactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDeactivated {}

/// Event body: Renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemRenamed {
    pub name: String,
}

/// Event body: ItemsCheckedIn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsCheckedIn {
    pub count: i64,
}

/// Event body: ItemsRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsRemoved {
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    Created(ItemCreated),
    Deactivated(ItemDeactivated),
    Renamed(ItemRenamed),
    ItemsCheckedIn(ItemsCheckedIn),
    ItemsRemoved(ItemsRemoved),
}

impl InventoryEvent {
    /// Decode a recorded event; `Ok(None)` for event types this model does not know.
    pub fn from_recorded(event_type: &str, body: &JsonValue) -> Result<Option<Self>, serde_json::Error> {
        let event = match event_type {
            "Created" => Self::Created(serde_json::from_value(body.clone())?),
            "Deactivated" => Self::Deactivated(ItemDeactivated {}),
            "Renamed" => Self::Renamed(serde_json::from_value(body.clone())?),
            "ItemsCheckedIn" => Self::ItemsCheckedIn(serde_json::from_value(body.clone())?),
            "ItemsRemoved" => Self::ItemsRemoved(serde_json::from_value(body.clone())?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::Created(_) => "Created",
            InventoryEvent::Deactivated(_) => "Deactivated",
            InventoryEvent::Renamed(_) => "Renamed",
            InventoryEvent::ItemsCheckedIn(_) => "ItemsCheckedIn",
            InventoryEvent::ItemsRemoved(_) => "ItemsRemoved",
        }
    }

    fn body(&self) -> Result<JsonValue, serde_json::Error> {
        match self {
            InventoryEvent::Created(e) => serde_json::to_value(e),
            InventoryEvent::Deactivated(e) => serde_json::to_value(e),
            InventoryEvent::Renamed(e) => serde_json::to_value(e),
            InventoryEvent::ItemsCheckedIn(e) => serde_json::to_value(e),
            InventoryEvent::ItemsRemoved(e) => serde_json::to_value(e),
        }
    }
}

impl Aggregate for InventoryItem {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::Created(e) => {
                self.name = e.name.clone();
                self.active = true;
                self.created = true;
            }
            InventoryEvent::Deactivated(_) => {
                self.active = false;
            }
            InventoryEvent::Renamed(e) => {
                self.name = e.name.clone();
            }
            InventoryEvent::ItemsCheckedIn(e) => {
                self.stock = self.stock.saturating_add(e.count);
            }
            InventoryEvent::ItemsRemoved(e) => {
                self.stock = self.stock.saturating_sub(e.count);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        if command.item_id() != self.id {
            return Err(DomainError::invariant("item_id mismatch"));
        }
        match command {
            InventoryCommand::Create(cmd) => self.handle_create(cmd),
            InventoryCommand::Rename(cmd) => self.handle_rename(cmd),
            InventoryCommand::Deactivate(_) => self.handle_deactivate(),
            InventoryCommand::CheckIn(cmd) => self.handle_check_in(cmd),
            InventoryCommand::Remove(cmd) => self.handle_remove(cmd),
        }
    }
}

impl InventoryItem {
    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn ensure_name(name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(())
    }

    fn ensure_positive(count: i64) -> Result<(), DomainError> {
        if count <= 0 {
            return Err(DomainError::validation("count must be positive"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateInventoryItem) -> Result<Vec<InventoryEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("item already exists"));
        }
        Self::ensure_name(&cmd.name)?;
        Ok(vec![InventoryEvent::Created(ItemCreated {
            name: cmd.name.clone(),
        })])
    }

    fn handle_rename(&self, cmd: &RenameInventoryItem) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_created()?;
        Self::ensure_name(&cmd.name)?;
        Ok(vec![InventoryEvent::Renamed(ItemRenamed {
            name: cmd.name.clone(),
        })])
    }

    fn handle_deactivate(&self) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_created()?;
        if !self.active {
            return Err(DomainError::conflict("item already deactivated"));
        }
        Ok(vec![InventoryEvent::Deactivated(ItemDeactivated {})])
    }

    fn handle_check_in(&self, cmd: &CheckInItemsToInventory) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_created()?;
        Self::ensure_positive(cmd.count)?;
        if self.stock.checked_add(cmd.count).is_none() {
            return Err(DomainError::invariant("stock would overflow"));
        }
        Ok(vec![InventoryEvent::ItemsCheckedIn(ItemsCheckedIn {
            count: cmd.count,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveItemsFromInventory) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_created()?;
        Self::ensure_positive(cmd.count)?;
        if self.stock.checked_sub(cmd.count).is_none_or(|left| left < 0) {
            return Err(DomainError::invariant("stock cannot go negative"));
        }
        Ok(vec![InventoryEvent::ItemsRemoved(ItemsRemoved {
            count: cmd.count,
        })])
    }
}
