//! Item, listing and shop-view records shared by the augmentation engine.
//!
//! The host owns the real item objects; these records carry exactly what the
//! engine needs to decide on injection and to revert a bought stack.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host item reference (the numeric object index of the host's item data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        ItemId(id)
    }
}

/// A plain stack of a host item, as constructed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    /// Sale price of the whole stack as reported by the host.
    pub sale_price: u32,
}

impl BaseItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, quantity: u32, sale_price: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            sale_price,
        }
    }

    /// Whether the host would pay anything for this stack.
    pub fn has_value(&self) -> bool {
        self.sale_price > 0
    }

    /// Name under which a catalog entry built from this stack is registered.
    pub fn derived_name(&self) -> String {
        format!("{} x{}", self.name, self.quantity)
    }
}

/// A shop-display artifact: `quantity` units of a base item tagged with the
/// shop that offered it and the condition that gated it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectedStack {
    pub base: BaseItem,
    pub owner: String,
    pub condition: Option<String>,
}

impl InjectedStack {
    pub fn new(base: BaseItem, owner: impl Into<String>, condition: Option<String>) -> Self {
        Self {
            base,
            owner: owner.into(),
            condition,
        }
    }

    /// Collapse into the ordinary stack it stands for.
    pub fn revert(self) -> BaseItem {
        self.base
    }

    pub fn quantity(&self) -> u32 {
        self.base.quantity
    }
}

/// Anything that can sit in a shop listing or a holder slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Plain(BaseItem),
    Injected(InjectedStack),
}

impl Item {
    /// Total reversion: injected stacks become plain, plain items are unchanged.
    pub fn revert(self) -> Item {
        match self {
            Item::Injected(stack) => Item::Plain(stack.revert()),
            plain => plain,
        }
    }

    pub fn is_injected(&self) -> bool {
        matches!(self, Item::Injected(_))
    }

    pub fn base(&self) -> &BaseItem {
        match self {
            Item::Plain(base) => base,
            Item::Injected(stack) => &stack.base,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().name
    }

    pub fn quantity(&self) -> u32 {
        self.base().quantity
    }

    pub fn sale_price(&self) -> u32 {
        self.base().sale_price
    }
}

/// Remaining stock of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stock {
    Limited(u32),
    Unbounded,
}

impl Stock {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Stock::Unbounded)
    }
}

/// One sellable entry of an open shop, with its price and stock metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub item: Item,
    pub price: u32,
    pub stock: Stock,
}

impl Listing {
    /// Listing priced at the item's sale price with unbounded stock.
    pub fn unbounded(item: Item) -> Self {
        let price = item.sale_price();
        Self {
            item,
            price,
            stock: Stock::Unbounded,
        }
    }
}

/// What the host exposes about the shop interface that just opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopContext {
    /// Display name of the portrait speaker, when the host exposes one.
    pub speaker: Option<String>,
    /// Greeting text shown next to the portrait.
    pub greeting: Option<String>,
    /// Name of the location the player is standing in.
    pub location: Option<String>,
}

impl ShopContext {
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn greeting(&self) -> &str {
        self.greeting.as_deref().unwrap_or("")
    }
}

/// Host-owned view of an open shop interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopMenu {
    pub context: ShopContext,
    pub for_sale: Vec<Listing>,
}

impl ShopMenu {
    pub fn new(context: ShopContext) -> Self {
        Self {
            context,
            for_sale: Vec::new(),
        }
    }

    pub fn add_listing(&mut self, listing: Listing) {
        self.for_sale.push(listing);
    }

    /// Number of listings carrying an injected stack.
    pub fn injected_count(&self) -> usize {
        self.for_sale.iter().filter(|l| l.item.is_injected()).count()
    }
}
