//! Configuration of the watcher

use crate::link::{DEFAULT_BASE_URL, SheetLink};
use crate::subscription::{Subscription, SubscriptionList};
use anyhow::{Context, Result};
use cellwatch_core::{ExtractLimits, RangeReference};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main watcher configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionConfig>,
}

impl WatchConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: WatchConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check intervals, limits and every subscription entry
    pub fn validate(&self) -> Result<()> {
        if self.global.poll_interval_secs == 0 {
            anyhow::bail!("Configuration error: poll_interval_secs must be greater than 0");
        }
        if self.global.fetch_timeout_secs == 0 {
            anyhow::bail!("Configuration error: fetch_timeout_secs must be greater than 0");
        }
        if self.global.max_range_cells == 0 {
            anyhow::bail!("Configuration error: max_range_cells must be greater than 0");
        }

        let mut names = HashSet::new();
        for entry in &self.subscriptions {
            if !names.insert(entry.name.trim()) {
                anyhow::bail!(
                    "Configuration error: Duplicate subscription name '{}'",
                    entry.name
                );
            }
            entry.to_subscription().with_context(|| {
                format!("Configuration error: Invalid subscription '{}'", entry.name)
            })?;
        }

        Ok(())
    }

    /// Build the subscription list described by the configuration
    pub fn subscriptions(&self) -> Result<SubscriptionList> {
        let mut list = SubscriptionList::new();
        for entry in &self.subscriptions {
            list.add(entry.to_subscription()?)?;
        }
        Ok(list)
    }

    pub fn limits(&self) -> ExtractLimits {
        ExtractLimits {
            max_cells: self.global.max_range_cells,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.global.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.global.fetch_timeout_secs)
    }
}

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Seconds between two sweeps
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Largest occupancy matrix an extraction may allocate
    #[serde(default = "default_max_range_cells")]
    pub max_range_cells: u64,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
            max_range_cells: default_max_range_cells(),
            base_url: default_base_url(),
        }
    }
}

fn default_poll_interval() -> u64 {
    30
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_max_range_cells() -> u64 {
    ExtractLimits::DEFAULT_MAX_CELLS
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// One `[[subscriptions]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    pub name: String,
    /// Spreadsheet link, usually with `#gid=..&range=..`
    pub url: String,
    /// Range overriding the one in the link ("A1" or "A1:B2")
    #[serde(default)]
    pub range: Option<String>,
    /// Tab id overriding the link's gid
    #[serde(default)]
    pub tab: Option<String>,
}

impl SubscriptionConfig {
    pub fn to_subscription(&self) -> Result<Subscription> {
        let mut link = SheetLink::parse(&self.url)?;
        if let Some(tab) = &self.tab {
            link.tab_id = Some(tab.clone());
        }
        let range = self
            .range
            .as_deref()
            .map(RangeReference::parse)
            .transpose()?;
        Ok(Subscription {
            name: self.name.clone(),
            target: link.into_target(range)?,
        })
    }
}
