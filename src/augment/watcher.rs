//! Holder reversion.
//!
//! An injected stack is only meaningful inside a shop listing. Once bought it
//! must collapse into the plain item it stands for, so it is indistinguishable
//! from the same item bought anywhere else.

use log::trace;

use crate::augment::types::Item;

/// Replace every injected stack in `slots` with its plain base item, in place.
///
/// Returns the number of slots that were rewritten.
pub fn revert_holder(slots: &mut [Option<Item>]) -> usize {
    let mut reverted = 0;
    for slot in slots.iter_mut() {
        let Some(Item::Injected(stack)) = slot.take_if(|item| item.is_injected()) else {
            continue;
        };
        trace!(
            "Reverting injected stack: {}:{} (from `{}`)",
            stack.base.name,
            stack.quantity(),
            stack.owner
        );
        *slot = Some(Item::Plain(stack.revert()));
        reverted += 1;
    }
    reverted
}
