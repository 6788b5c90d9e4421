//! Watched ranges and the last value seen for each of them

use anyhow::Result;
use cellwatch_core::RangeReference;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A fully specified range to watch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTarget {
    pub document_id: String,
    /// Internal tab id; `None` is only valid for single-tab documents
    pub tab_id: Option<String>,
    pub range: RangeReference,
}

/// A named watch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub name: String,
    pub target: WatchTarget,
}

/// Subscriptions kept sorted by name, names unique
#[derive(Debug, Clone, Default)]
pub struct SubscriptionList {
    items: Vec<Subscription>,
}

impl SubscriptionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscription; empty or duplicate names are rejected
    pub fn add(&mut self, mut subscription: Subscription) -> Result<()> {
        let name = subscription.name.trim().to_string();
        if name.is_empty() {
            anyhow::bail!("Subscription name must not be empty");
        }
        if self.get(&name).is_some() {
            anyhow::bail!("Subscription name '{}' is already used", name);
        }
        subscription.name = name;
        let pos = self
            .items
            .binary_search_by(|s| s.name.as_str().cmp(&subscription.name))
            .unwrap_or_else(|pos| pos);
        self.items.insert(pos, subscription);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Subscription> {
        let pos = self.items.iter().position(|s| s.name == name)?;
        Some(self.items.remove(pos))
    }

    pub fn get(&self, name: &str) -> Option<&Subscription> {
        self.items.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Storage of the last value observed per subscription name
pub trait ValueStore {
    fn last_value(&self, name: &str) -> Option<String>;

    /// Record `value` and return the value to compare it against.
    ///
    /// On the first observation nothing is stored yet, so `value` itself is
    /// returned and no change is reported.
    fn update(&mut self, name: &str, value: &str) -> String;

    fn forget(&mut self, name: &str);
}

/// In-process [`ValueStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ValueStore for MemoryStore {
    fn last_value(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn update(&mut self, name: &str, value: &str) -> String {
        match self.values.insert(name.to_string(), value.to_string()) {
            Some(previous) => previous,
            None => value.to_string(),
        }
    }

    fn forget(&mut self, name: &str) {
        self.values.remove(name);
    }
}
