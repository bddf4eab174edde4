//! Catalog load: the orderable fruits for one pipeline run.
use serde::Serialize;

use crate::error::CatalogUnavailable;
use crate::store::{CatalogRow, CatalogStore};

/// One orderable fruit and the key used to look it up in the nutrition API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FruitCatalogEntry {
    pub display_name: String,
    pub search_key: String,
}

/// Snapshot of `fruit_options` taken at the start of a run, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<FruitCatalogEntry>,
}

impl Catalog {
    /// Build a catalog from raw rows.
    ///
    /// Rows with a blank name are skipped and repeated names keep their first
    /// occurrence, so display names stay unique and non-empty.
    pub fn from_rows(rows: Vec<CatalogRow>) -> Self {
        let mut entries: Vec<FruitCatalogEntry> = Vec::with_capacity(rows.len());
        for row in rows {
            let display_name = row.fruit_name.trim().to_string();
            if display_name.is_empty() {
                tracing::warn!("skipping fruit option with blank name");
                continue;
            }
            if entries.iter().any(|entry| entry.display_name == display_name) {
                tracing::warn!(fruit = %display_name, "skipping duplicate fruit option");
                continue;
            }
            let search_key = row
                .search_on
                .as_deref()
                .map(normalize_search_key)
                .filter(|key| !key.is_empty())
                .unwrap_or_else(|| normalize_search_key(&display_name));
            entries.push(FruitCatalogEntry {
                display_name,
                search_key,
            });
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[FruitCatalogEntry] {
        &self.entries
    }

    pub fn get(&self, display_name: &str) -> Option<&FruitCatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.display_name == display_name)
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.get(display_name).is_some()
    }

    pub fn display_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.display_name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercase and collapse internal whitespace: `"  Dragon  Fruit "` -> `"dragon fruit"`.
pub fn normalize_search_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Read the whole catalog store. No retry; the caller surfaces the failure once.
pub fn load_catalog(store: &dyn CatalogStore) -> Result<Catalog, CatalogUnavailable> {
    let rows = store.read_all().map_err(|err| CatalogUnavailable {
        detail: format!("{err:#}"),
    })?;
    let catalog = Catalog::from_rows(rows);
    tracing::info!(entries = catalog.len(), "catalog loaded");
    Ok(catalog)
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
