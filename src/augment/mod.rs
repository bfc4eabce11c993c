//! Shop augmentation engine.
//! Injects configured catalog items into merchant shops when they open and
//! reverts bought stacks into ordinary items. The host environment (events,
//! item construction, condition checks) is reached only through [`host`].

pub mod catalog;
pub mod controller;
pub mod engine;
pub mod errors;
pub mod host;
pub mod resolver;
pub mod startup;
pub mod types;
pub mod watcher;

pub use catalog::{build, prepare_entry, BuildReport, CatalogEntry, RawEntry, Registry};
pub use controller::{
    Controller, MenuChange, MenuKind, OpenOutcome, SessionState, ShopSession,
};
pub use engine::Engine;
pub use errors::ExpanderError;
pub use host::{
    ConditionEvaluator, EntrySource, EventHub, Hook, HookSet, Host, ItemFactory, ItemSpec,
    ItemTable,
};
pub use resolver::{is_unknown_owner, resolve, OWNER_UNKNOWN};
pub use startup::{DeferredBuild, DEFAULT_SETTLE_DELAY};
pub use types::*;
pub use watcher::revert_holder;
