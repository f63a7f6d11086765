//! Service configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! [snapshot]
//! path = "data/openpowerlifting_clean.parquet"
//! ttl_secs = 3600
//!
//! [views]
//! ttl_secs = 300
//! max_entries = 256
//!
//! [engine]
//! bucket_count = 100
//! group_percentile = 0.9
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::{DEFAULT_BUCKET_COUNT, DEFAULT_GROUP_PERCENTILE};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiftrankConfig {
    pub snapshot: SnapshotConfig,
    pub views: ViewConfig,
    pub engine: EngineConfig,
}

/// Where the canonical snapshot lives and how long a load stays fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    pub ttl_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/openpowerlifting_clean.parquet"),
            ttl_secs: 3600,
        }
    }
}

impl SnapshotConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Filtered-view cache bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_entries: 256,
        }
    }
}

impl ViewConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub bucket_count: usize,
    /// Quantile of the group's totals a total must exceed to rank `Above`.
    pub group_percentile: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            group_percentile: DEFAULT_GROUP_PERCENTILE,
        }
    }
}

impl LiftrankConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.bucket_count == 0 {
            return Err(ConfigError::Invalid("engine.bucket_count must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.engine.group_percentile) {
            return Err(ConfigError::Invalid(format!(
                "engine.group_percentile must be in [0, 1], got {}",
                self.engine.group_percentile
            )));
        }
        if self.snapshot.ttl_secs == 0 {
            return Err(ConfigError::Invalid("snapshot.ttl_secs must be positive".into()));
        }
        if self.views.ttl_secs == 0 {
            return Err(ConfigError::Invalid("views.ttl_secs must be positive".into()));
        }
        if self.views.max_entries == 0 {
            return Err(ConfigError::Invalid("views.max_entries must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LiftrankConfig::default();
        assert_eq!(config.snapshot.path, PathBuf::from("data/openpowerlifting_clean.parquet"));
        assert_eq!(config.snapshot.ttl(), Duration::from_secs(3600));
        assert_eq!(config.views.ttl(), Duration::from_secs(300));
        assert_eq!(config.views.max_entries, 256);
        assert_eq!(config.engine.bucket_count, 100);
        assert_eq!(config.engine.group_percentile, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(LiftrankConfig::from_toml_str("").unwrap(), LiftrankConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = LiftrankConfig::from_toml_str(
            r#"
            [engine]
            bucket_count = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.bucket_count, 40);
        assert_eq!(config.engine.group_percentile, 0.9);
        assert_eq!(config.views.ttl_secs, 300);
    }

    #[test]
    fn test_rejects_invalid_values() {
        for doc in [
            "[engine]\nbucket_count = 0",
            "[engine]\ngroup_percentile = 1.5",
            "[snapshot]\nttl_secs = 0",
            "[views]\nttl_secs = 0",
        ] {
            assert!(
                matches!(LiftrankConfig::from_toml_str(doc), Err(ConfigError::Invalid(_))),
                "accepted: {doc}"
            );
        }
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let result = LiftrankConfig::from_toml_str("[engine]\nbins = 10");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = LiftrankConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(LiftrankConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("liftrank.toml");
        std::fs::write(&path, "[snapshot]\npath = \"clean.parquet\"\n").unwrap();

        let config = LiftrankConfig::from_file(&path).unwrap();
        assert_eq!(config.snapshot.path, PathBuf::from("clean.parquet"));
        assert!(matches!(
            LiftrankConfig::from_file(&dir.path().join("missing.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
