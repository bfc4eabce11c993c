//! Shop session state machine and catalog injection.
//!
//! A session runs `Closed -> Open(unaugmented) -> Open(augmented) -> Closed`.
//! The holder-change hook is subscribed exactly while an augmented session
//! is open.

use log::{debug, trace, warn};
use std::sync::Arc;

use crate::augment::catalog::{CatalogEntry, Registry};
use crate::augment::host::{ConditionEvaluator, EventHub, Hook};
use crate::augment::resolver::{is_unknown_owner, resolve};
use crate::augment::types::{InjectedStack, Item, Listing, ShopMenu};

/// Kind of menu that was replaced by a menu change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Shop,
    Other,
}

/// A menu-changed notification from the host.
///
/// `new` is `None` when the menu closed or the new menu is not a shop.
#[derive(Debug)]
pub struct MenuChange<'a> {
    pub old: Option<MenuKind>,
    pub new: Option<&'a mut ShopMenu>,
}

impl<'a> MenuChange<'a> {
    /// A shop opened with no menu before it.
    pub fn opened(menu: &'a mut ShopMenu) -> Self {
        Self {
            old: None,
            new: Some(menu),
        }
    }

    /// The open shop closed.
    pub fn closed() -> Self {
        Self {
            old: Some(MenuKind::Shop),
            new: None,
        }
    }

    /// The open shop was replaced by another shop.
    pub fn replaced(menu: &'a mut ShopMenu) -> Self {
        Self {
            old: Some(MenuKind::Shop),
            new: Some(menu),
        }
    }
}

/// Transient state of one open shop interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSession {
    pub owner: String,
    pub augmented: bool,
    pub injected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Unaugmented,
    Augmented,
}

/// What happened when a shop opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    Augmented {
        owner: String,
        injected: usize,
        condition_errors: usize,
    },
    Unaugmented {
        owner: String,
        condition_errors: usize,
    },
    /// A shop opened while another session was still open; nothing was done.
    IgnoredReopen,
}

impl OpenOutcome {
    pub fn injected(&self) -> usize {
        match self {
            OpenOutcome::Augmented { injected, .. } => *injected,
            _ => 0,
        }
    }

    pub fn condition_errors(&self) -> usize {
        match self {
            OpenOutcome::Augmented { condition_errors, .. }
            | OpenOutcome::Unaugmented { condition_errors, .. } => *condition_errors,
            OpenOutcome::IgnoredReopen => 0,
        }
    }
}

/// Decides, per opened shop, which catalog entries get injected.
#[derive(Debug)]
pub struct Controller {
    registry: Arc<Registry>,
    session: Option<ShopSession>,
}

impl Controller {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            session: None,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn session(&self) -> Option<&ShopSession> {
        self.session.as_ref()
    }

    pub fn state(&self) -> SessionState {
        match &self.session {
            None => SessionState::Closed,
            Some(s) if s.augmented => SessionState::Augmented,
            Some(_) => SessionState::Unaugmented,
        }
    }

    /// Whether bought stacks in the holder should currently be reverted.
    pub fn is_watching(&self) -> bool {
        self.state() == SessionState::Augmented
    }

    /// Handle a menu change: tear down the old session first, then open the new one.
    pub fn on_menu_changed(
        &mut self,
        change: MenuChange<'_>,
        conditions: &dyn ConditionEvaluator,
        hub: &mut dyn EventHub,
    ) -> Option<OpenOutcome> {
        match change.new {
            None => {
                self.close(hub);
                None
            }
            Some(menu) => {
                if change.old == Some(MenuKind::Shop) {
                    self.close(hub);
                }
                Some(self.open(menu, conditions, hub))
            }
        }
    }

    /// Start a session for `menu`, injecting every qualifying entry.
    pub fn open(
        &mut self,
        menu: &mut ShopMenu,
        conditions: &dyn ConditionEvaluator,
        hub: &mut dyn EventHub,
    ) -> OpenOutcome {
        if let Some(ref current) = self.session {
            warn!(
                "Shop opened while the session for `{}` is still open; ignoring",
                current.owner
            );
            return OpenOutcome::IgnoredReopen;
        }

        trace!("Shop menu active, checking for expansion");
        let owner = resolve(&menu.context);

        if !self.registry.has_owner(&owner) {
            if is_unknown_owner(&owner) {
                trace!("The shop owner could not be resolved, skipping shop");
            } else {
                debug!("The shop owned by `{}` is not on the list, ignoring it", owner);
            }
            self.session = Some(ShopSession {
                owner: owner.clone(),
                augmented: false,
                injected: 0,
            });
            return OpenOutcome::Unaugmented {
                owner,
                condition_errors: 0,
            };
        }

        trace!("Shop owned by `{}` gets modified, doing so now", owner);
        let (injected, condition_errors) = self.inject(&owner, menu, conditions);
        let augmented = injected > 0;
        if augmented {
            hub.subscribe(Hook::HolderChanged);
        }
        debug!(
            "Session for `{}` opened with {} injected listings",
            owner, injected
        );
        self.session = Some(ShopSession {
            owner: owner.clone(),
            augmented,
            injected,
        });

        if augmented {
            OpenOutcome::Augmented {
                owner,
                injected,
                condition_errors,
            }
        } else {
            OpenOutcome::Unaugmented {
                owner,
                condition_errors,
            }
        }
    }

    /// End the current session, unsubscribing the holder hook if it was live.
    pub fn close(&mut self, hub: &mut dyn EventHub) -> Option<ShopSession> {
        let session = self.session.take()?;
        if session.augmented {
            hub.unsubscribe(Hook::HolderChanged);
        }
        debug!("Session for `{}` closed", session.owner);
        Some(session)
    }

    /// Returns (injected listings, condition evaluation errors).
    fn inject(
        &self,
        owner: &str,
        menu: &mut ShopMenu,
        conditions: &dyn ConditionEvaluator,
    ) -> (usize, usize) {
        let mut injected = 0;
        let mut errors = 0;

        for entry in self.registry.entries_for(owner) {
            match condition_met(entry, conditions) {
                Ok(true) => {}
                Ok(false) => {
                    trace!("Item({}){{Location=true,Condition=false}}", entry.derived_name);
                    continue;
                }
                Err(()) => {
                    errors += 1;
                    continue;
                }
            }

            let item = if entry.base.quantity == 1 {
                trace!("Item({}){{Location=true,Condition=true,Stack=false}}", entry.derived_name);
                Item::Plain(entry.base.clone())
            } else {
                trace!("Item({}){{Location=true,Condition=true,Stack=true}}", entry.derived_name);
                Item::Injected(InjectedStack::new(
                    entry.base.clone(),
                    owner,
                    entry.condition.clone(),
                ))
            };
            menu.add_listing(Listing::unbounded(item));
            injected += 1;
        }

        (injected, errors)
    }
}

/// Evaluation errors are logged here and count as "not met" for the caller.
fn condition_met(entry: &CatalogEntry, conditions: &dyn ConditionEvaluator) -> Result<bool, ()> {
    let Some(ref expression) = entry.condition else {
        return Ok(true);
    };
    conditions.evaluate(expression).map_err(|e| {
        debug!(
            "Condition for `{}` could not be evaluated, treating as not met: {}",
            entry.derived_name, e
        );
    })
}
