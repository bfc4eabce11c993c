//! Host-facing entry points of the augmentation engine.
//!
//! The host forwards its update-tick, menu-changed and holder-changed events
//! here. The engine arms the one-shot catalog build on attach, builds the
//! registry once the settle delay has passed, and from then on routes shop
//! menus through the [`Controller`] and holder changes through the watcher.

use log::{error, info, trace};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::augment::catalog::{build, BuildReport, Registry};
use crate::augment::controller::{Controller, MenuChange, OpenOutcome, ShopSession};
use crate::augment::host::{ConditionEvaluator, EventHub, Hook, Host};
use crate::augment::startup::DeferredBuild;
use crate::augment::types::Item;
use crate::augment::watcher::revert_holder;
use crate::metrics::{EngineMetrics, Snapshot};

#[derive(Debug)]
pub struct Engine {
    startup: DeferredBuild,
    controller: Option<Controller>,
    report: Option<BuildReport>,
    metrics: EngineMetrics,
}

impl Engine {
    pub fn new(settle: Duration) -> Self {
        Self {
            startup: DeferredBuild::new(settle),
            controller: None,
            report: None,
            metrics: EngineMetrics::new(),
        }
    }

    /// Engine around a registry built elsewhere; no deferred build is needed.
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        let mut startup = DeferredBuild::default();
        startup.fire_now();
        Self {
            startup,
            controller: Some(Controller::new(registry)),
            report: None,
            metrics: EngineMetrics::new(),
        }
    }

    /// Subscribe to the host's events and arm the deferred build.
    pub fn attach(&mut self, hub: &mut dyn EventHub, now: Instant) {
        hub.subscribe(Hook::MenuChanged);
        if !self.startup.has_fired() {
            hub.subscribe(Hook::UpdateTicked);
            self.startup.arm(now);
        }
    }

    /// Update tick. Returns true on the tick that performed the catalog build.
    pub fn on_update_tick<H: Host>(&mut self, now: Instant, host: &mut H) -> bool {
        if !self.startup.poll(now) {
            return false;
        }
        self.run_build(host);
        true
    }

    /// The host's configuration became available; build without waiting further.
    pub fn config_ready<H: Host>(&mut self, host: &mut H) -> bool {
        if !self.startup.fire_now() {
            return false;
        }
        self.run_build(host);
        true
    }

    fn run_build<H: Host>(&mut self, host: &mut H) {
        host.unsubscribe(Hook::UpdateTicked);

        let registry = match host.read_entries() {
            Ok(entries) => {
                let (registry, report) = build(&entries, &*host);
                self.metrics
                    .record_build(report.accepted, report.rejected, report.duplicates);
                self.report = Some(report);
                registry
            }
            Err(e) => {
                error!("Failed to read catalog configuration, shops stay unmodified: {}", e);
                Registry::new()
            }
        };

        info!(
            "Shop expansion ready: {} catalog entries across {} shops",
            registry.len(),
            registry.owners().count()
        );
        self.controller = Some(Controller::new(Arc::new(registry)));
    }

    /// A menu opened, closed or was replaced.
    pub fn on_menu_changed(
        &mut self,
        change: MenuChange<'_>,
        conditions: &dyn ConditionEvaluator,
        hub: &mut dyn EventHub,
    ) -> Option<OpenOutcome> {
        let Some(controller) = self.controller.as_mut() else {
            trace!("Menu changed before the catalog was built; ignoring");
            return None;
        };

        let outcome = controller.on_menu_changed(change, conditions, hub)?;
        match &outcome {
            OpenOutcome::Augmented {
                injected,
                condition_errors,
                ..
            } => {
                self.metrics.inc_sessions_opened();
                self.metrics.record_augmented(*injected);
                self.metrics.add_conditions_failed(*condition_errors);
            }
            OpenOutcome::Unaugmented {
                condition_errors, ..
            } => {
                self.metrics.inc_sessions_opened();
                self.metrics.add_conditions_failed(*condition_errors);
            }
            OpenOutcome::IgnoredReopen => self.metrics.inc_reopen_violations(),
        }
        Some(outcome)
    }

    /// Holder contents changed. Returns how many stacks were reverted.
    pub fn on_holder_changed(&mut self, is_local: bool, slots: &mut [Option<Item>]) -> usize {
        if !is_local {
            trace!("Ignoring holder change for a remote holder");
            return 0;
        }
        if !self.is_watching() {
            return 0;
        }
        let reverted = revert_holder(slots);
        self.metrics.add_stacks_reverted(reverted);
        reverted
    }

    pub fn is_ready(&self) -> bool {
        self.controller.is_some()
    }

    pub fn is_watching(&self) -> bool {
        self.controller.as_ref().is_some_and(Controller::is_watching)
    }

    pub fn registry(&self) -> Option<&Arc<Registry>> {
        self.controller.as_ref().map(Controller::registry)
    }

    pub fn session(&self) -> Option<&ShopSession> {
        self.controller.as_ref().and_then(Controller::session)
    }

    /// Counts from the deferred build, if it ran.
    pub fn build_report(&self) -> Option<BuildReport> {
        self.report
    }

    pub fn metrics(&self) -> Snapshot {
        self.metrics.snapshot()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(crate::augment::startup::DEFAULT_SETTLE_DELAY)
    }
}
