//! Capabilities the engine consumes from its host.
//!
//! The engine never talks to a game directly. Everything it needs (item
//! construction, condition checks, event subscriptions, config storage) comes
//! in through the traits below, so the core stays testable with plain structs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::augment::catalog::RawEntry;
use crate::augment::errors::ExpanderError;
use crate::augment::types::{BaseItem, ItemId};

/// Evaluates a condition expression against the host's current world state.
pub trait ConditionEvaluator {
    fn evaluate(&self, expression: &str) -> Result<bool, ExpanderError>;
}

/// Constructs item stacks from a reference id and a quantity.
pub trait ItemFactory {
    fn create_item(&self, id: ItemId, quantity: u32) -> Result<BaseItem, ExpanderError>;
}

/// Host-provided configuration storage holding the raw catalog entries.
pub trait EntrySource {
    fn read_entries(&self) -> Result<Vec<RawEntry>, ExpanderError>;
}

/// Host events the engine can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hook {
    UpdateTicked,
    MenuChanged,
    HolderChanged,
}

/// Subscription surface of the host's event dispatcher.
pub trait EventHub {
    fn subscribe(&mut self, hook: Hook);
    fn unsubscribe(&mut self, hook: Hook);
}

/// Everything the one-shot catalog build needs from the host.
pub trait Host: EntrySource + ItemFactory + EventHub {}

impl<T: EntrySource + ItemFactory + EventHub> Host for T {}

/// Minimal event hub that only remembers which hooks are live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookSet {
    active: BTreeSet<Hook>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_subscribed(&self, hook: Hook) -> bool {
        self.active.contains(&hook)
    }

    pub fn active(&self) -> impl Iterator<Item = Hook> + '_ {
        self.active.iter().copied()
    }
}

impl EventHub for HookSet {
    fn subscribe(&mut self, hook: Hook) {
        self.active.insert(hook);
    }

    fn unsubscribe(&mut self, hook: Hook) {
        self.active.remove(&hook);
    }
}

/// One row of a static item table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub id: ItemId,
    pub name: String,
    /// Unit sale price.
    #[serde(default)]
    pub price: u32,
}

/// Item factory backed by a static table, used when no live host is present.
#[derive(Debug, Clone, Default)]
pub struct ItemTable {
    items: HashMap<ItemId, ItemSpec>,
}

impl ItemTable {
    pub fn new<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = ItemSpec>,
    {
        Self {
            items: specs.into_iter().map(|spec| (spec.id, spec)).collect(),
        }
    }
}

impl ItemFactory for ItemTable {
    fn create_item(&self, id: ItemId, quantity: u32) -> Result<BaseItem, ExpanderError> {
        let spec = self.items.get(&id).ok_or(ExpanderError::UnknownItem(id))?;
        Ok(BaseItem::new(
            id,
            spec.name.clone(),
            quantity,
            spec.price.saturating_mul(quantity),
        ))
    }
}
