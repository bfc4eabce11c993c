//! Integration tests for shop sessions: injection, conditions and subscriptions

mod common;

use std::sync::Arc;

use shopexpand::augment::{
    build, Controller, EventHub, ExpanderError, Hook, HookSet, Item, MenuChange, OpenOutcome,
    SessionState, ShopContext, ShopMenu, Stock,
};
use shopexpand::augment::host::ConditionEvaluator;
use shopexpand::conditions::{WorldConditions, WorldState};

fn controller() -> Controller {
    let (registry, _) = build(&common::catalog_entries(), &common::item_table());
    Controller::new(Arc::new(registry))
}

fn spring() -> WorldConditions {
    WorldConditions::new(WorldState::default())
}

fn shop(speaker: &str) -> ShopMenu {
    ShopMenu::new(ShopContext::default().with_speaker(speaker))
}

struct Unavailable;

impl ConditionEvaluator for Unavailable {
    fn evaluate(&self, expression: &str) -> Result<bool, ExpanderError> {
        Err(ExpanderError::Condition {
            expression: expression.to_string(),
            reason: "world not loaded".to_string(),
        })
    }
}

#[test]
fn test_stack_entry_becomes_single_unbounded_listing() {
    let mut controller = controller();
    let mut hooks = HookSet::new();
    let mut menu = ShopMenu::new(ShopContext::default().with_location("JojaMart"));

    let outcome = controller
        .on_menu_changed(MenuChange::opened(&mut menu), &spring(), &mut hooks)
        .unwrap();

    assert_eq!(outcome.injected(), 1);
    assert_eq!(menu.for_sale.len(), 1);
    let listing = &menu.for_sale[0];
    assert_eq!(listing.stock, Stock::Unbounded);
    assert_eq!(listing.price, 100);
    assert_eq!(listing.item.quantity(), 10);
    assert!(listing.item.is_injected());
    assert_eq!(listing.item.name(), "Parsnip Seeds");
}

#[test]
fn test_single_quantity_entry_is_a_plain_item() {
    let mut controller = controller();
    let mut hooks = HookSet::new();
    let mut menu = shop("Pierre");

    controller.on_menu_changed(MenuChange::opened(&mut menu), &spring(), &mut hooks);

    assert_eq!(menu.for_sale.len(), 2);
    assert!(menu.for_sale[0].item.is_injected());
    assert!(matches!(menu.for_sale[1].item, Item::Plain(_)));
    assert_eq!(menu.for_sale[1].price, 250);
    assert_eq!(menu.injected_count(), 1);
}

#[test]
fn test_existing_listings_are_kept() {
    let mut controller = controller();
    let mut hooks = HookSet::new();
    let mut menu = shop("Traveler");
    menu.add_listing(shopexpand::augment::Listing {
        item: Item::Plain(shopexpand::augment::BaseItem::new(388, "Wood", 1, 2)),
        price: 2,
        stock: Stock::Limited(4),
    });

    controller.on_menu_changed(MenuChange::opened(&mut menu), &spring(), &mut hooks);

    assert_eq!(menu.for_sale.len(), 2);
    assert_eq!(menu.for_sale[0].stock, Stock::Limited(4));
    assert_eq!(menu.for_sale[1].item.name(), "Emerald");
}

#[test]
fn test_conditions_gate_entries() {
    let mut hooks = HookSet::new();

    let mut controller = controller();
    let mut menu = shop("Robin");
    let outcome = controller
        .on_menu_changed(MenuChange::opened(&mut menu), &spring(), &mut hooks)
        .unwrap();
    assert!(menu.for_sale.is_empty());
    assert!(matches!(outcome, OpenOutcome::Unaugmented { ref owner, .. } if owner == "Robin"));
    assert_eq!(controller.state(), SessionState::Unaugmented);
    assert!(!hooks.is_subscribed(Hook::HolderChanged));
    controller.on_menu_changed(MenuChange::closed(), &spring(), &mut hooks);

    let summer = WorldConditions::new(WorldState {
        season: "summer".to_string(),
        ..WorldState::default()
    });
    let mut menu = shop("Robin");
    controller.on_menu_changed(MenuChange::opened(&mut menu), &summer, &mut hooks);
    assert_eq!(menu.for_sale.len(), 1);
    assert_eq!(controller.state(), SessionState::Augmented);
}

#[test]
fn test_condition_errors_count_as_not_met() {
    let mut controller = controller();
    let mut hooks = HookSet::new();
    let mut menu = shop("Robin");

    let outcome = controller
        .on_menu_changed(MenuChange::opened(&mut menu), &Unavailable, &mut hooks)
        .unwrap();

    assert_eq!(outcome.condition_errors(), 1);
    assert!(menu.for_sale.is_empty());

    // Unconditional entries are not affected by a broken evaluator.
    controller.on_menu_changed(MenuChange::closed(), &Unavailable, &mut hooks);
    let mut menu = shop("Pierre");
    let outcome = controller
        .on_menu_changed(MenuChange::opened(&mut menu), &Unavailable, &mut hooks)
        .unwrap();
    assert_eq!(outcome.injected(), 2);
    assert_eq!(outcome.condition_errors(), 0);
}

#[test]
fn test_unlisted_and_unknown_shops_are_untouched() {
    let mut controller = controller();
    let mut hooks = HookSet::new();

    let mut menu = shop("Willy");
    controller.on_menu_changed(MenuChange::opened(&mut menu), &spring(), &mut hooks);
    assert!(menu.for_sale.is_empty());
    controller.on_menu_changed(MenuChange::closed(), &spring(), &mut hooks);

    let mut menu = ShopMenu::new(ShopContext::default().with_location("Forest"));
    let outcome = controller
        .on_menu_changed(MenuChange::opened(&mut menu), &spring(), &mut hooks)
        .unwrap();
    assert!(matches!(outcome, OpenOutcome::Unaugmented { ref owner, .. } if owner == "unknown"));
    assert!(menu.for_sale.is_empty());
    assert!(hooks.active().next().is_none());
}

#[test]
fn test_reopen_without_close_is_ignored() {
    let mut controller = controller();
    let mut hooks = HookSet::new();
    let mut menu = shop("Pierre");

    controller.on_menu_changed(MenuChange::opened(&mut menu), &spring(), &mut hooks);
    let outcome = controller.on_menu_changed(MenuChange::opened(&mut menu), &spring(), &mut hooks);

    assert_eq!(outcome, Some(OpenOutcome::IgnoredReopen));
    assert_eq!(menu.for_sale.len(), 2, "no duplicate listings");
    assert_eq!(controller.session().unwrap().owner, "Pierre");
}

#[test]
fn test_replacing_a_shop_closes_the_old_session_first() {
    let mut controller = controller();
    let mut hooks = HookSet::new();

    let mut pierre = shop("Pierre");
    controller.on_menu_changed(MenuChange::opened(&mut pierre), &spring(), &mut hooks);
    let mut willy = shop("Willy");
    let outcome = controller
        .on_menu_changed(MenuChange::replaced(&mut willy), &spring(), &mut hooks)
        .unwrap();

    assert!(matches!(outcome, OpenOutcome::Unaugmented { .. }));
    assert_eq!(controller.session().unwrap().owner, "Willy");
    assert!(!hooks.is_subscribed(Hook::HolderChanged));
}

#[test]
fn test_holder_hook_is_live_only_while_augmented() {
    let mut controller = controller();
    let mut hooks = HookSet::new();
    assert_eq!(controller.state(), SessionState::Closed);

    let mut menu = shop("Pierre");
    controller.on_menu_changed(MenuChange::opened(&mut menu), &spring(), &mut hooks);
    assert!(hooks.is_subscribed(Hook::HolderChanged));
    assert!(controller.is_watching());

    controller.on_menu_changed(MenuChange::closed(), &spring(), &mut hooks);
    assert!(!hooks.is_subscribed(Hook::HolderChanged));
    assert_eq!(controller.state(), SessionState::Closed);

    // A close with nothing open is harmless.
    assert!(controller.close(&mut hooks).is_none());
    hooks.unsubscribe(Hook::HolderChanged);
    assert!(hooks.active().next().is_none());
}
