//! Configuration management for duo-relay

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot storage settings
    pub storage: StorageConfig,
    /// Snapshot trigger settings
    pub snapshot: SnapshotConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

/// Storage-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for snapshot records
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".duo-relay"),
        }
    }
}

/// Snapshot-trigger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Save a snapshot after this many mutations; 0 disables
    /// mutation-triggered saves (explicit saves still work)
    pub every_mutations: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            every_mutations: 25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.data_dir, PathBuf::from(".duo-relay"));
        assert_eq!(config.snapshot.every_mutations, 25);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[storage]"));
        assert!(toml.contains("[snapshot]"));

        let config2: Config = toml::from_str(&toml).unwrap();
        assert_eq!(
            config.snapshot.every_mutations,
            config2.snapshot.every_mutations
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[snapshot]\nevery_mutations = 5\n").unwrap();
        assert_eq!(config.snapshot.every_mutations, 5);
        assert_eq!(config.storage.data_dir, PathBuf::from(".duo-relay"));
    }
}
