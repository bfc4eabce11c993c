//! # shopexpand - Shop Augmentation Engine
//!
//! shopexpand injects configured "virtual" catalog items into specific merchant
//! shops at the moment a shop interface opens, and collapses a bought compound
//! stack back into the ordinary item it stands for once it reaches the player's
//! inventory.
//!
//! ## Features
//!
//! - **Catalog Building**: Validates configured `(owner, item, amount, condition)` entries once at startup; bad entries are logged and skipped.
//! - **Owner Resolution**: Identifies the merchant behind a shop even when the host exposes no speaker, using location names and known greetings.
//! - **Conditional Injection**: Gates entries with condition expressions evaluated against the current world state.
//! - **Revert on Acquire**: Bought injected stacks become plain items, indistinguishable from ones bought elsewhere.
//! - **Host Agnostic**: Every host capability (events, item construction, conditions) is a trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Instant;
//! use shopexpand::augment::{Engine, HookSet, MenuChange, ShopContext, ShopMenu};
//! use shopexpand::conditions::WorldConditions;
//! use shopexpand::config::Config;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("shopexpand.toml")?;
//!     let mut engine = Engine::new(config.engine.settle_delay());
//!     let mut hooks = HookSet::new();
//!     engine.attach(&mut hooks, Instant::now());
//!
//!     // A host that already has its configuration can skip the settle delay.
//!     let mut host = shopexpand::SimulatedHost::new(&config, hooks);
//!     engine.config_ready(&mut host);
//!
//!     let mut menu = ShopMenu::new(ShopContext::default().with_speaker("Pierre"));
//!     let conditions = WorldConditions::new(config.world.clone());
//!     engine.on_menu_changed(MenuChange::opened(&mut menu), &conditions, host.hooks_mut());
//!     println!("{} listings", menu.for_sale.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`augment`] - Catalog, owner resolution, session controller, revert watcher, engine facade
//! - [`conditions`] - Condition expression parser and evaluator over a world snapshot
//! - [`config`] - TOML configuration
//! - [`metrics`] - Per-engine counters
//! - [`logutil`] - Single-line escaping of host text for logs

pub mod augment;
pub mod conditions;
pub mod config;
pub mod logutil;
pub mod metrics;
pub mod sim;

pub use sim::SimulatedHost;
