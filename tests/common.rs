//! Test utilities & fixtures.
//! Shared item table, catalog entries and a configured simulated host.

use std::path::{Path, PathBuf};

use shopexpand::augment::{HookSet, ItemSpec, ItemTable, RawEntry};
use shopexpand::SimulatedHost;

/// Return the path to the static integration test fixture directory.
#[allow(dead_code)]
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test-data-int")
}

fn spec(id: u32, name: &str, price: u32) -> ItemSpec {
    ItemSpec {
        id: id.into(),
        name: name.to_string(),
        price,
    }
}

/// Small item table: a few sellable items and one worthless one.
#[allow(dead_code)]
pub fn item_table() -> ItemTable {
    ItemTable::new(vec![
        spec(24, "Parsnip", 35),
        spec(60, "Emerald", 250),
        spec(168, "Trash", 0),
        spec(388, "Wood", 2),
        spec(472, "Parsnip Seeds", 10),
    ])
}

/// Catalog used by most session tests.
#[allow(dead_code)]
pub fn catalog_entries() -> Vec<RawEntry> {
    vec![
        RawEntry::new("Pierre", 24, 5),
        RawEntry::new("Pierre", 60, 1),
        RawEntry::new("Robin", 388, 99).with_conditions("season(\"summer\")"),
        RawEntry::new("Joja", 472, 10),
        RawEntry::new("Traveler", 60, 3),
    ]
}

/// Simulated host over [`catalog_entries`] and [`item_table`].
#[allow(dead_code)]
pub fn host() -> SimulatedHost {
    SimulatedHost::from_parts(catalog_entries(), item_table(), HookSet::new())
}
