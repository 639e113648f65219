use std::collections::BTreeMap;

use assetflow_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::request::RequestItem;

/// How fulfillment of a catalog entry is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemTracking {
    /// Undifferentiated material satisfied by stock counts.
    Bulk,
    /// Devices requiring a distinct asset tag per unit.
    Serialized,
}

impl ItemTracking {
    /// Returns a stable storage value for this tracking mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bulk => "bulk",
            Self::Serialized => "serialized",
        }
    }
}

/// One catalog declaration mapping an item name and brand to its class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Item name as written on request lines.
    pub name: NonEmptyString,
    /// Item brand as written on request lines.
    pub brand: NonEmptyString,
    /// Category label for reporting.
    pub category: NonEmptyString,
    /// Fulfillment tracking mode.
    pub tracking: ItemTracking,
}

/// Indexed `(name, brand)` lookup over catalog entries, built once.
///
/// Replaces the source behavior of scanning categories in declaration order:
/// lookups here are keyed, so no result depends on iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogIndex {
    entries: BTreeMap<(String, String), CatalogEntry>,
}

impl CatalogIndex {
    /// Builds the index from catalog declarations.
    ///
    /// Duplicate `(name, brand)` declarations are a conflict, since they
    /// would make the class of a request line ambiguous.
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> AppResult<Self> {
        let mut index = BTreeMap::new();

        for entry in entries {
            let key = (
                normalize(entry.name.as_str()),
                normalize(entry.brand.as_str()),
            );
            if index.contains_key(&key) {
                return Err(AppError::Conflict(format!(
                    "catalog already declares item '{}' brand '{}'",
                    entry.name, entry.brand
                )));
            }

            index.insert(key, entry);
        }

        Ok(Self { entries: index })
    }

    /// Looks up the catalog entry for an item name and brand.
    #[must_use]
    pub fn lookup(&self, name: &str, brand: &str) -> Option<&CatalogEntry> {
        self.entries.get(&(normalize(name), normalize(brand)))
    }

    /// Resolves the tracking mode for a request line.
    ///
    /// Lines without a catalog declaration are treated as bulk material.
    #[must_use]
    pub fn tracking_for(&self, item: &RequestItem) -> ItemTracking {
        self.lookup(item.name(), item.brand())
            .map_or(ItemTracking::Bulk, |entry| entry.tracking)
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
