//! Catalog building: turns raw configured entries into the registry of
//! injectable items.
//!
//! Each entry is validated on its own. A bad entry is logged and skipped, it
//! never stops the rest of the catalog from loading.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::augment::errors::ExpanderError;
use crate::augment::host::ItemFactory;
use crate::augment::resolver::is_unknown_owner;
use crate::augment::types::{BaseItem, ItemId};

/// A catalog entry as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// Owner id of the shop that should offer the item.
    pub owner: String,
    /// Host item reference.
    pub item: ItemId,
    /// Stack size offered per purchase.
    pub amount: u32,
    /// Optional condition expression gating the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

impl RawEntry {
    pub fn new(owner: impl Into<String>, item: impl Into<ItemId>, amount: u32) -> Self {
        Self {
            owner: owner.into(),
            item: item.into(),
            amount,
            conditions: None,
        }
    }

    pub fn with_conditions(mut self, conditions: impl Into<String>) -> Self {
        self.conditions = Some(conditions.into());
        self
    }
}

impl fmt::Display for RawEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}x{}", self.owner, self.item, self.amount)?;
        if let Some(ref cond) = self.conditions {
            write!(f, " if {}", cond)?;
        }
        Ok(())
    }
}

/// A validated entry ready to be injected into its owner's shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub owner: String,
    pub base: BaseItem,
    pub condition: Option<String>,
    pub derived_name: String,
}

/// Validated catalog, built once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, usize>,
    owners: BTreeSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, in registration order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, derived_name: &str) -> Option<&CatalogEntry> {
        self.by_name.get(derived_name).map(|&idx| &self.entries[idx])
    }

    /// Whether any entry targets this owner.
    pub fn has_owner(&self, owner: &str) -> bool {
        self.owners.contains(owner)
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.owners.iter().map(String::as_str)
    }

    /// Entries targeting one owner, in registration order.
    pub fn entries_for<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries.iter().filter(move |entry| entry.owner == owner)
    }

    /// Store an entry unless its derived name is taken. Returns false on a duplicate.
    fn insert(&mut self, entry: CatalogEntry) -> bool {
        if self.by_name.contains_key(&entry.derived_name) {
            return false;
        }
        self.owners.insert(entry.owner.clone());
        self.by_name
            .insert(entry.derived_name.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }
}

/// Outcome counts of a catalog build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
}

/// Validate a single raw entry into a catalog entry.
pub fn prepare_entry(
    raw: &RawEntry,
    factory: &dyn ItemFactory,
) -> Result<CatalogEntry, ExpanderError> {
    if is_unknown_owner(&raw.owner) {
        return Err(ExpanderError::UnknownOwner { item: raw.item });
    }
    if raw.amount == 0 {
        return Err(ExpanderError::ZeroAmount {
            owner: raw.owner.clone(),
            item: raw.item,
        });
    }

    let base = factory.create_item(raw.item, raw.amount)?;
    if !base.has_value() {
        return Err(ExpanderError::Worthless {
            owner: raw.owner.clone(),
            item: raw.item,
        });
    }

    let condition = raw
        .conditions
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Ok(CatalogEntry {
        owner: raw.owner.clone(),
        derived_name: base.derived_name(),
        base,
        condition,
    })
}

/// Build the registry from configured entries.
///
/// Rejected entries are logged at error level; duplicate derived names are
/// dropped quietly, the first registration wins.
pub fn build(entries: &[RawEntry], factory: &dyn ItemFactory) -> (Registry, BuildReport) {
    let mut registry = Registry::new();
    let mut report = BuildReport::default();

    for raw in entries {
        match prepare_entry(raw, factory) {
            Ok(entry) => {
                let name = entry.derived_name.clone();
                if registry.insert(entry) {
                    report.accepted += 1;
                } else {
                    debug!("Catalog entry `{}` already registered, skipping {}", name, raw);
                    report.duplicates += 1;
                }
            }
            Err(e) => {
                error!("Catalog entry failed to generate: {} ({})", raw, e);
                report.rejected += 1;
            }
        }
    }

    info!(
        "Catalog built: {} entries for {} shops ({} rejected, {} duplicates)",
        report.accepted,
        registry.owners.len(),
        report.rejected,
        report.duplicates
    );
    (registry, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::host::{ItemSpec, ItemTable};

    fn table() -> ItemTable {
        ItemTable::new(vec![
            ItemSpec {
                id: ItemId(24),
                name: "Parsnip".to_string(),
                price: 35,
            },
            ItemSpec {
                id: ItemId(168),
                name: "Trash".to_string(),
                price: 0,
            },
        ])
    }

    #[test]
    fn blank_conditions_are_dropped() {
        let raw = RawEntry::new("Pierre", 24, 5).with_conditions("   ");
        let entry = prepare_entry(&raw, &table()).unwrap();
        assert_eq!(entry.condition, None);
        assert_eq!(entry.derived_name, "Parsnip x5");
    }

    #[test]
    fn rejections_carry_their_reason() {
        let t = table();
        assert!(matches!(
            prepare_entry(&RawEntry::new("unknown", 24, 5), &t),
            Err(ExpanderError::UnknownOwner { .. })
        ));
        assert!(matches!(
            prepare_entry(&RawEntry::new("???", 24, 5), &t),
            Err(ExpanderError::UnknownOwner { .. })
        ));
        assert!(matches!(
            prepare_entry(&RawEntry::new("Pierre", 24, 0), &t),
            Err(ExpanderError::ZeroAmount { .. })
        ));
        assert!(matches!(
            prepare_entry(&RawEntry::new("Pierre", 168, 3), &t),
            Err(ExpanderError::Worthless { .. })
        ));
        assert!(matches!(
            prepare_entry(&RawEntry::new("Pierre", 1, 3), &t),
            Err(ExpanderError::UnknownItem(ItemId(1)))
        ));
    }

    #[test]
    fn entries_for_keeps_registration_order() {
        let entries = vec![
            RawEntry::new("Pierre", 24, 5),
            RawEntry::new("Robin", 24, 10),
            RawEntry::new("Pierre", 24, 20),
        ];
        let (registry, report) = build(&entries, &table());
        assert_eq!(report.accepted, 3);
        let names: Vec<_> = registry
            .entries_for("Pierre")
            .map(|e| e.derived_name.as_str())
            .collect();
        assert_eq!(names, vec!["Parsnip x5", "Parsnip x20"]);
        assert_eq!(registry.owners().collect::<Vec<_>>(), vec!["Pierre", "Robin"]);
    }

    #[test]
    fn raw_entry_display_is_compact() {
        let raw = RawEntry::new("Pierre", 24, 5).with_conditions("has_flag(\"ccPantry\")");
        assert_eq!(raw.to_string(), "Pierre:24x5 if has_flag(\"ccPantry\")");
    }
}
