//! Provider configuration
//!
//! One [`ProviderConfig`] per configured event mesh source, read from a
//! YAML file keyed by provider id:
//!
//! ```yaml
//! providers:
//!   dev:
//!     baseUrl: http://eventmesh.dev.example.com
//!     schedule:
//!       frequencySeconds: 60
//! catalog:
//!   baseUrl: http://catalog.example.com/api
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors; all fatal at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A provider has no schedule and no default was supplied
    #[error("no schedule provided neither via config nor a default for provider '{0}'")]
    MissingSchedule(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Recurrence of a provider's sync task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDefinition {
    pub frequency_seconds: u64,
    #[serde(default)]
    pub initial_delay_seconds: u64,
}

impl ScheduleDefinition {
    pub fn every_seconds(frequency_seconds: u64) -> Self {
        ScheduleDefinition {
            frequency_seconds,
            initial_delay_seconds: 0,
        }
    }

    pub fn frequency(&self) -> Duration {
        Duration::from_secs(self.frequency_seconds)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_seconds)
    }
}

/// One configured event mesh source. `id` must be unique; it is used
/// verbatim in provider naming and location key construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub id: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleDefinition>,
}

/// Catalog store endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Fully parsed configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppConfig {
    pub providers: Vec<ProviderConfig>,
    pub catalog: Option<CatalogConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    providers: IndexMap<String, ProviderEntry>,
    #[serde(default)]
    catalog: Option<CatalogConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderEntry {
    base_url: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    schedule: Option<ScheduleDefinition>,
}

impl AppConfig {
    /// Load configuration from a YAML file. An absent `providers` block
    /// yields an empty provider list, not an error.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn parse(raw: &str) -> Result<AppConfig, serde_yaml::Error> {
        let file: ConfigFile = serde_yaml::from_str(raw)?;
        let providers = file
            .providers
            .into_iter()
            .map(|(id, entry)| ProviderConfig {
                id,
                base_url: entry.base_url,
                token: entry.token,
                schedule: entry.schedule,
            })
            .collect();
        Ok(AppConfig {
            providers,
            catalog: file.catalog,
        })
    }
}
