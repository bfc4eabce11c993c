//! # Configuration Management Module
//!
//! Loads the shop-expansion configuration: the catalog entries to inject,
//! the engine's startup timing, logging settings, and the item table and
//! world snapshot used by the offline simulator.
//!
//! ## Configuration File Format
//!
//! ```toml
//! [engine]
//! settle_delay_ms = 50
//!
//! [logging]
//! level = "info"
//! file = "shopexpand.log"
//!
//! [[objects]]
//! owner = "Pierre"
//! item = 24
//! amount = 5
//! conditions = "season(\"spring\")"
//!
//! [[items]]
//! id = 24
//! name = "Parsnip"
//! price = 35
//!
//! [world]
//! season = "spring"
//! day = 3
//! ```
//!
//! Only `[[objects]]` is read by a live host. The other sections have
//! defaults, so a file with nothing but objects is valid.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::augment::catalog::RawEntry;
use crate::augment::errors::ExpanderError;
use crate::augment::host::{EntrySource, ItemSpec, ItemTable};
use crate::augment::resolver::is_unknown_owner;
use crate::conditions::{compile_condition, WorldState};
use crate::logutil::escape_log;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Delay between attach and the one-shot catalog build (ms).
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_settle_delay_ms() -> u64 {
    50
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl EngineConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Parsed level filter; unknown names fall back to `info`.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Catalog entries to inject.
    #[serde(default)]
    pub objects: Vec<RawEntry>,
    /// Item table for the offline simulator.
    #[serde(default)]
    pub items: Vec<ItemSpec>,
    /// World snapshot for the offline simulator.
    #[serde(default)]
    pub world: WorldState,
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;

        Self::from_toml_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ExpanderError> {
        Ok(toml::from_str(content)?)
    }

    /// Create a default configuration file
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(&Config::sample())
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path.display(), e))?;

        Ok(())
    }

    /// Starter configuration written by `shopexpand init`.
    pub fn sample() -> Self {
        Config {
            objects: vec![
                RawEntry::new("Pierre", 24, 5).with_conditions("season(\"spring\")"),
                RawEntry::new("Robin", 388, 99),
                RawEntry::new("Traveler", 472, 10).with_conditions("$day >= 15"),
                RawEntry::new("Joja", 60, 1),
            ],
            items: vec![
                ItemSpec {
                    id: 24.into(),
                    name: "Parsnip".to_string(),
                    price: 35,
                },
                ItemSpec {
                    id: 388.into(),
                    name: "Wood".to_string(),
                    price: 2,
                },
                ItemSpec {
                    id: 472.into(),
                    name: "Parsnip Seeds".to_string(),
                    price: 10,
                },
                ItemSpec {
                    id: 60.into(),
                    name: "Emerald".to_string(),
                    price: 250,
                },
            ],
            ..Config::default()
        }
    }

    /// Item factory over the configured item table.
    pub fn item_table(&self) -> ItemTable {
        ItemTable::new(self.items.iter().cloned())
    }

    /// Problems that will make entries get rejected or misbehave at build time.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for (idx, entry) in self.objects.iter().enumerate() {
            if is_unknown_owner(&entry.owner) {
                warnings.push(format!(
                    "objects[{}]: owner `{}` means the shop is unknown and can never match",
                    idx, entry.owner
                ));
            }
            if entry.amount == 0 {
                warnings.push(format!("objects[{}]: amount must be at least 1", idx));
            }
            if let Some(ref cond) = entry.conditions {
                if !cond.trim().is_empty() {
                    if let Err(e) = compile_condition(cond) {
                        warnings.push(format!(
                            "objects[{}]: condition `{}` does not parse: {}",
                            idx,
                            escape_log(cond),
                            e
                        ));
                    }
                }
            }
            if !seen.insert((entry.item, entry.amount)) {
                warnings.push(format!(
                    "objects[{}]: item {} x{} is already listed; only the first entry is used",
                    idx, entry.item, entry.amount
                ));
            }
        }

        let mut ids = HashSet::new();
        for spec in &self.items {
            if !ids.insert(spec.id) {
                warnings.push(format!("items: id {} is defined more than once", spec.id));
            }
        }

        warnings
    }
}

impl EntrySource for Config {
    fn read_entries(&self) -> Result<Vec<RawEntry>, ExpanderError> {
        Ok(self.objects.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_only_file_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [[objects]]
            owner = "Pierre"
            item = 24
            amount = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.objects.len(), 1);
        assert_eq!(config.objects[0].conditions, None);
        assert_eq!(config.engine.settle_delay(), Duration::from_millis(50));
        assert_eq!(config.logging.level_filter(), log::LevelFilter::Info);
        assert!(config.items.is_empty());
    }

    #[test]
    fn sample_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::sample()).unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed.objects, Config::sample().objects);
        assert_eq!(parsed.items.len(), 4);
        assert!(parsed.validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_entries() {
        let config = Config {
            objects: vec![
                RawEntry::new("???", 24, 5),
                RawEntry::new("Pierre", 24, 0),
                RawEntry::new("Pierre", 60, 1).with_conditions("$day >"),
                RawEntry::new("Robin", 60, 1),
                RawEntry::new("Pierre", 24, 7).with_conditions(vec!["true"; 200].join(" && ")),
            ],
            ..Config::default()
        };
        let warnings = config.validate();
        assert_eq!(warnings.len(), 5, "{:?}", warnings);
        assert!(warnings[0].contains("unknown"));
        assert!(warnings[1].contains("amount"));
        assert!(warnings[2].contains("does not parse"));
        assert!(warnings[3].contains("already listed"));
        assert!(warnings[4].contains("longer than 512"));
    }

    #[test]
    fn bad_level_falls_back_to_info() {
        let logging = LoggingConfig {
            level: "chatty".to_string(),
            file: None,
        };
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
        let logging = LoggingConfig {
            level: "trace".to_string(),
            file: None,
        };
        assert_eq!(logging.level_filter(), log::LevelFilter::Trace);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml_str("[[objects]]\nowner = 3"),
            Err(ExpanderError::Toml(_))
        ));
    }
}
