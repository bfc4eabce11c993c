//! In-process host used by the command line simulator and integration tests.
//!
//! It answers the engine's host capabilities from configuration data and keeps
//! a small player inventory so purchases can be replayed end to end.

use log::debug;

use crate::augment::catalog::RawEntry;
use crate::augment::errors::ExpanderError;
use crate::augment::host::{EntrySource, EventHub, Hook, HookSet, ItemFactory, ItemTable};
use crate::augment::types::{BaseItem, Item, ItemId, ShopMenu};
use crate::config::Config;

/// Slots in the simulated player inventory.
pub const HOLDER_SLOTS: usize = 12;

#[derive(Debug, Clone)]
pub struct SimulatedHost {
    entries: Vec<RawEntry>,
    items: ItemTable,
    hooks: HookSet,
    /// Player inventory; `None` is an empty slot.
    pub holder: Vec<Option<Item>>,
}

impl SimulatedHost {
    pub fn new(config: &Config, hooks: HookSet) -> Self {
        Self::from_parts(config.objects.clone(), config.item_table(), hooks)
    }

    pub fn from_parts(entries: Vec<RawEntry>, items: ItemTable, hooks: HookSet) -> Self {
        Self {
            entries,
            items,
            hooks,
            holder: vec![None; HOLDER_SLOTS],
        }
    }

    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookSet {
        &mut self.hooks
    }

    /// Buy listing `index` from `menu` into the first free holder slot.
    ///
    /// Returns the slot used, or `None` if the listing does not exist or the
    /// holder is full.
    pub fn buy(&mut self, menu: &ShopMenu, index: usize) -> Option<usize> {
        let listing = menu.for_sale.get(index)?;
        let slot = self.holder.iter().position(Option::is_none)?;
        debug!(
            "Bought {} x{} for {}",
            listing.item.name(),
            listing.item.quantity(),
            listing.price
        );
        self.holder[slot] = Some(listing.item.clone());
        Some(slot)
    }

    /// Occupied holder slots with their positions.
    pub fn held(&self) -> impl Iterator<Item = (usize, &Item)> {
        self.holder
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|item| (idx, item)))
    }
}

impl EntrySource for SimulatedHost {
    fn read_entries(&self) -> Result<Vec<RawEntry>, ExpanderError> {
        Ok(self.entries.clone())
    }
}

impl ItemFactory for SimulatedHost {
    fn create_item(&self, id: ItemId, quantity: u32) -> Result<BaseItem, ExpanderError> {
        self.items.create_item(id, quantity)
    }
}

impl EventHub for SimulatedHost {
    fn subscribe(&mut self, hook: Hook) {
        self.hooks.subscribe(hook);
    }

    fn unsubscribe(&mut self, hook: Hook) {
        self.hooks.unsubscribe(hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::types::{Listing, ShopContext};

    #[test]
    fn buy_fills_first_free_slot() {
        let mut host = SimulatedHost::from_parts(Vec::new(), ItemTable::default(), HookSet::new());
        host.holder[0] = Some(Item::Plain(BaseItem::new(0, "Hoe", 1, 10)));

        let mut menu = ShopMenu::new(ShopContext::default());
        menu.add_listing(Listing::unbounded(Item::Plain(BaseItem::new(60, "Emerald", 1, 250))));

        assert_eq!(host.buy(&menu, 0), Some(1));
        assert_eq!(host.buy(&menu, 5), None);
        assert_eq!(host.held().count(), 2);
    }

    #[test]
    fn buy_fails_when_holder_is_full() {
        let mut host = SimulatedHost::from_parts(Vec::new(), ItemTable::default(), HookSet::new());
        for slot in host.holder.iter_mut() {
            *slot = Some(Item::Plain(BaseItem::new(388, "Wood", 1, 2)));
        }
        let mut menu = ShopMenu::new(ShopContext::default());
        menu.add_listing(Listing::unbounded(Item::Plain(BaseItem::new(60, "Emerald", 1, 250))));
        assert_eq!(host.buy(&menu, 0), None);
    }
}
