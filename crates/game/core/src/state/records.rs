//! Per-NPC bookkeeping: string variables, inventory and the monster index.

use std::collections::BTreeMap;

/// String key/value store used by scripts and combat results.
///
/// Values are always strings; numeric helpers parse on demand.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GameVariables {
    values: BTreeMap<String, String>,
}

impl GameVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the value parsed as a float, if present and numeric.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|value| value.trim().parse().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Item slug to quantity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Inventory {
    items: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity(&self, slug: &str) -> u32 {
        self.items.get(slug).copied().unwrap_or(0)
    }

    pub fn add(&mut self, slug: impl Into<String>, quantity: u32) {
        if quantity == 0 {
            return;
        }
        *self.items.entry(slug.into()).or_insert(0) += quantity;
    }

    /// Removes up to `quantity` items and returns how many were actually removed.
    ///
    /// Entries reaching zero are dropped.
    pub fn remove(&mut self, slug: &str, quantity: u32) -> u32 {
        let Some(held) = self.items.get_mut(slug) else {
            return 0;
        };
        let taken = quantity.min(*held);
        *held -= taken;
        if *held == 0 {
            self.items.remove(slug);
        }
        taken
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// How far the player has progressed with a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SeenStatus {
    Seen,
    Caught,
}

/// Species index keyed by monster slug.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Tuxepedia {
    entries: BTreeMap<String, SeenStatus>,
}

impl Tuxepedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a status, never downgrading `Caught` to `Seen`.
    pub fn record(&mut self, slug: impl Into<String>, status: SeenStatus) {
        let entry = self.entries.entry(slug.into()).or_insert(status);
        if status > *entry {
            *entry = status;
        }
    }

    pub fn status(&self, slug: &str) -> Option<SeenStatus> {
        self.entries.get(slug).copied()
    }

    pub fn count(&self, status: SeenStatus) -> usize {
        self.entries.values().filter(|s| **s >= status).count()
    }
}
