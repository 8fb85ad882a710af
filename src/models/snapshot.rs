//! Persisted snapshot of the upstream properties collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::records::Listing;

/// The last successfully fetched properties collection plus its staleness
/// timestamp. Replaced wholesale on every successful refresh; never cleared on
/// failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub properties: Vec<Listing>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub count: usize,
}

impl Snapshot {
    /// Build a snapshot; `count` always mirrors `properties.len()`.
    pub fn new(properties: Vec<Listing>, last_updated: Option<DateTime<Utc>>) -> Self {
        let count = properties.len();
        Self {
            properties,
            last_updated,
            count,
        }
    }

    /// An empty snapshot (cold boot with no disk state).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Re-establish `count == properties.len()` after deserializing foreign or
    /// hand-edited disk state.
    pub fn normalized(mut self) -> Self {
        self.count = self.properties.len();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
