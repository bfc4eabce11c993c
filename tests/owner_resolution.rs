//! Integration tests for shop owner resolution

use shopexpand::augment::resolver::{
    CLINT_UPGRADE_GREETING, HAT_MOUSE_GREETING, TRAVELER_GREETINGS,
};
use shopexpand::augment::{resolve, ShopContext, OWNER_UNKNOWN};

fn at(location: &str, greeting: &str) -> ShopContext {
    ShopContext::default()
        .with_location(location)
        .with_greeting(greeting)
}

#[test]
fn test_resolution_is_pure() {
    let ctx = at("Forest", TRAVELER_GREETINGS[1]);
    let first = resolve(&ctx);
    for _ in 0..3 {
        assert_eq!(resolve(&ctx), first);
    }
    assert_eq!(first, "Traveler");
}

#[test]
fn test_blacksmith_has_two_shops() {
    let upgrade = ShopContext::default()
        .with_speaker("Clint")
        .with_greeting(CLINT_UPGRADE_GREETING);
    assert_eq!(resolve(&upgrade), "ClintUpgrade");

    let shop = ShopContext::default()
        .with_speaker("Clint")
        .with_greeting("Too bad you don't have any ore to sell.");
    assert_eq!(resolve(&shop), "Clint");
}

#[test]
fn test_speaker_wins_over_location() {
    let ctx = ShopContext::default()
        .with_speaker("Willy")
        .with_location("JojaMart");
    assert_eq!(resolve(&ctx), "Willy");
}

#[test]
fn test_location_table() {
    assert_eq!(resolve(&ShopContext::default().with_location("JojaMart")), "Joja");
    assert_eq!(resolve(&ShopContext::default().with_location("Club")), "MisterQi");
    assert_eq!(resolve(&ShopContext::default().with_location("Hospital")), "Hospital");
    assert_eq!(resolve(&ShopContext::default().with_location("Beach")), OWNER_UNKNOWN);
}

#[test]
fn test_forest_stalls() {
    assert_eq!(resolve(&at("Forest", HAT_MOUSE_GREETING)), "HatMouse");
    for greeting in TRAVELER_GREETINGS {
        assert_eq!(resolve(&at("Forest", greeting)), "Traveler");
    }
    let requested = format!("{}Cauliflower!", TRAVELER_GREETINGS[4]);
    assert_eq!(resolve(&at("Forest", &requested)), "Traveler");
}

#[test]
fn test_custom_forest_shops_stay_unknown() {
    assert_eq!(resolve(&at("Forest", "Welcome to my secret stand")), OWNER_UNKNOWN);
    assert_eq!(resolve(&at("Forest", "")), OWNER_UNKNOWN);
    assert_eq!(resolve(&ShopContext::default().with_location("Forest")), OWNER_UNKNOWN);
    // Only the last greeting is matched as a prefix.
    let extended = format!("{} See you next week.", TRAVELER_GREETINGS[0]);
    assert_eq!(resolve(&at("Forest", &extended)), OWNER_UNKNOWN);
}

#[test]
fn test_empty_context_is_unknown() {
    assert_eq!(resolve(&ShopContext::default()), OWNER_UNKNOWN);
}
