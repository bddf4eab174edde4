//! Bounded selection of catalog ingredients.
use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::SelectionError;

/// Most ingredients a single order may hold.
pub const MAX_SELECTIONS: usize = 5;

/// Ordered, validated display names picked from one catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection {
    items: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one pick, refusing it once the selection is full.
    pub fn push(&mut self, catalog: &Catalog, display_name: &str) -> Result<(), SelectionError> {
        if self.items.len() >= MAX_SELECTIONS {
            return Err(SelectionError::TooMany {
                limit: MAX_SELECTIONS,
                requested: self.items.len() + 1,
            });
        }
        if !catalog.contains(display_name) {
            return Err(SelectionError::UnknownIngredient(display_name.to_string()));
        }
        if self.items.iter().any(|item| item == display_name) {
            return Err(SelectionError::Duplicate(display_name.to_string()));
        }
        self.items.push(display_name.to_string());
        Ok(())
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Validate a raw pick list against the catalog of the current run.
///
/// Unknown names are rejected rather than dropped. Oversized lists are refused
/// as a whole; nothing is truncated.
pub fn apply_selection(catalog: &Catalog, raw: &[String]) -> Result<Selection, SelectionError> {
    if raw.len() > MAX_SELECTIONS {
        return Err(SelectionError::TooMany {
            limit: MAX_SELECTIONS,
            requested: raw.len(),
        });
    }
    let mut selection = Selection::new();
    for name in raw {
        selection.push(catalog, name)?;
    }
    Ok(selection)
}

#[cfg(test)]
#[path = "selection_tests.rs"]
mod tests;
