//! Shop Owner Resolution
//!
//! Maps an open shop interface to the owner id used by catalog entries.
//! The host exposes a portrait speaker for most merchants, but shops bound to
//! a location (the forest stalls, the clinic counter, the casino, the
//! supermarket) have none, and the blacksmith runs two different shops. For
//! those the visible greeting text and the location name are the only
//! discriminators available.
//!
//! ## Resolution order
//! 1. **Speaker name**: used directly as the owner
//! 2. **Speaker remap**: `Clint` with the tool-upgrade greeting becomes `ClintUpgrade`
//! 3. **Location table**: location name, refined by greeting for the forest
//! 4. **Fallback**: [`OWNER_UNKNOWN`]
//!
//! ## Examples
//! ```ignore
//! let ctx = ShopContext::default().with_location("JojaMart");
//! assert_eq!(resolve(&ctx), "Joja");
//! ```

use log::trace;

use crate::augment::types::ShopContext;
use crate::logutil::escape_log;

/// Owner id returned when a shop cannot be identified.
pub const OWNER_UNKNOWN: &str = "unknown";

/// Older configuration files spell the unknown owner this way.
const LEGACY_OWNER_UNKNOWN: &str = "???";

/// Greeting of the blacksmith's tool-upgrade counter.
pub const CLINT_UPGRADE_GREETING: &str =
    "I can upgrade your tools with more power. You'll have to leave them with me for a few days, though.";

/// Greeting of the hat stall in the forest.
pub const HAT_MOUSE_GREETING: &str = "Hiyo, poke. Did you bring coins? Gud. Me sell hats.";

/// Greetings of the travelling merchant's cart.
pub const TRAVELER_GREETINGS: [&str; 5] = [
    "I've got a little bit of everything. Take a look!",
    "I smuggled these goods out of the Gotoro Empire. Why do you think they're so expensive?",
    "I'll have new items every week, so make sure to come back!",
    "Beautiful country you have here. One of my favorite stops. The pig likes it, too.",
    "Let me see... Oh! I've got just what you need: ",
];

/// Whether an owner id is the unresolved sentinel (either spelling).
pub fn is_unknown_owner(owner: &str) -> bool {
    owner == OWNER_UNKNOWN || owner == LEGACY_OWNER_UNKNOWN
}

/// Resolve the owner id of an open shop.
///
/// Pure: the same context always yields the same id.
pub fn resolve(context: &ShopContext) -> String {
    let owner = match context.speaker.as_deref() {
        Some(speaker) => resolve_speaker(speaker, context.greeting()),
        None => resolve_location(context.location.as_deref(), context.greeting()),
    };

    trace!(
        "Resolved shop owner `{}` (speaker={:?}, location={:?}, greeting=\"{}\")",
        owner,
        context.speaker,
        context.location,
        escape_log(context.greeting())
    );
    owner
}

fn resolve_speaker(speaker: &str, greeting: &str) -> String {
    // The blacksmith has two shops behind the same portrait.
    if speaker == "Clint" && greeting == CLINT_UPGRADE_GREETING {
        return "ClintUpgrade".to_string();
    }
    speaker.to_string()
}

fn resolve_location(location: Option<&str>, greeting: &str) -> String {
    let owner = match location {
        Some("Forest") => resolve_forest(greeting),
        Some("Hospital") => Some("Hospital"),
        Some("Club") => Some("MisterQi"),
        Some("JojaMart") => Some("Joja"),
        _ => None,
    };
    owner.unwrap_or(OWNER_UNKNOWN).to_string()
}

/// Two unowned stalls share the forest; custom unowned shops there stay unknown.
fn resolve_forest(greeting: &str) -> Option<&'static str> {
    if greeting == HAT_MOUSE_GREETING {
        return Some("HatMouse");
    }

    // Only the last greeting is checked as a prefix; the cart appends the
    // requested item's name to it.
    let prefix = TRAVELER_GREETINGS[4];
    if TRAVELER_GREETINGS.contains(&greeting) || greeting.starts_with(prefix) {
        Some("Traveler")
    } else {
        None
    }
}
