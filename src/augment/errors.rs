use thiserror::Error;

use crate::augment::types::ItemId;

/// Errors that can arise while building the catalog or talking to the host.
///
/// None of these are allowed to escape an event callback: catalog entries
/// that fail are logged and skipped, condition failures count as "not met".
#[derive(Debug, Error)]
pub enum ExpanderError {
    /// Entry targets the unresolved-owner sentinel.
    #[error("entry for item {item} targets the unknown owner; an entry cannot target an unresolved shop")]
    UnknownOwner { item: ItemId },

    /// Entry declares a stack of zero items.
    #[error("entry for item {item} owned by `{owner}` has an amount of zero")]
    ZeroAmount { owner: String, item: ItemId },

    /// Constructed item has no sale value and cannot be sold.
    #[error("item {item} has no value and cannot be added to `{owner}`")]
    Worthless { owner: String, item: ItemId },

    /// The host does not know the referenced item.
    #[error("unknown item reference: {0}")]
    UnknownItem(ItemId),

    /// Condition expression could not be parsed or evaluated.
    #[error("condition `{expression}` failed: {reason}")]
    Condition { expression: String, reason: String },

    /// Configuration storage could not be read.
    #[error("configuration error: {0}")]
    Config(String),

    /// Wrapper around TOML parse errors.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ExpanderError {
    /// Whether this error belongs to a single rejected catalog entry.
    pub fn is_entry_invalid(&self) -> bool {
        matches!(
            self,
            ExpanderError::UnknownOwner { .. }
                | ExpanderError::ZeroAmount { .. }
                | ExpanderError::Worthless { .. }
                | ExpanderError::UnknownItem(_)
        )
    }
}
