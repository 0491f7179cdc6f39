//! YAML configuration for compute-cluster sizing
//!
//! ```yaml
//! dask_cluster:
//!   small:
//!     n_workers: 4
//!     threads_per_worker: 1
//!     memory_limit: "4GB"
//!   big:
//!     n_workers: 28
//!     threads_per_worker: 1
//!     memory_limit: "None"
//! ```
//!
//! The literal string `"None"` leaves a setting unset, as does omitting it.

use crate::errors::{AcdError, Result};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the default configuration path
pub const CONFIG_ENV_VAR: &str = "ACDTOOLS_CONFIG";

/// File looked for in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterConfig {
    /// Cluster settings keyed by work type
    #[serde(default)]
    pub dask_cluster: BTreeMap<String, ClusterSettings>,
}

/// Sizing for one work type; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClusterSettings {
    #[serde(default, deserialize_with = "optional_count")]
    pub n_workers: Option<usize>,
    #[serde(default, deserialize_with = "optional_count")]
    pub threads_per_worker: Option<usize>,
    #[serde(default, deserialize_with = "optional_text")]
    pub memory_limit: Option<String>,
    /// Settings this crate does not act on (dashboard address, processes, ...)
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_yaml::Value>,
}

fn is_unset(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::String(s) => s == "None",
        _ => false,
    }
}

fn optional_count<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    if is_unset(&value) {
        return Ok(None);
    }
    match value.as_u64() {
        Some(n) => Ok(Some(n as usize)),
        None => Err(serde::de::Error::custom(format!(
            "expected a non-negative integer or \"None\", got {:?}",
            value
        ))),
    }
}

fn optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    if is_unset(&value) {
        return Ok(None);
    }
    match value {
        serde_yaml::Value::String(s) => Ok(Some(s)),
        serde_yaml::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected a memory size or \"None\", got {:?}",
            other
        ))),
    }
}

impl ClusterConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AcdError::InvalidConfig {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Settings for `work_type`; unknown work types get all-default settings
    pub fn settings(&self, work_type: &str) -> ClusterSettings {
        match self.dask_cluster.get(work_type) {
            Some(settings) => settings.clone(),
            None => {
                tracing::warn!(work_type, "no cluster settings for work type, using defaults");
                ClusterSettings::default()
            }
        }
    }
}

/// `$ACDTOOLS_CONFIG` if set, otherwise `config.yaml` in the working directory
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
