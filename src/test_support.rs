//! In-memory stand-ins for the stores and the nutrition API.
use anyhow::{anyhow, Result};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::error::EnrichmentFailure;
use crate::nutrition::{EnrichmentResult, NutritionSource};
use crate::store::{CatalogRow, CatalogStore, NewOrder, OrderId, OrderStore};

pub struct FakeCatalogStore {
    pub rows: Vec<CatalogRow>,
    pub failure: Option<String>,
    pub reads: Cell<usize>,
}

impl FakeCatalogStore {
    /// Catalog of `(FRUIT_NAME, SEARCH_ON)` pairs.
    pub fn with(entries: &[(&str, &str)]) -> Self {
        let rows = entries
            .iter()
            .map(|(name, key)| CatalogRow {
                fruit_name: name.to_string(),
                search_on: Some(key.to_string()),
            })
            .collect();
        Self {
            rows,
            failure: None,
            reads: Cell::new(0),
        }
    }

    pub fn unreachable(detail: &str) -> Self {
        Self {
            rows: Vec::new(),
            failure: Some(detail.to_string()),
            reads: Cell::new(0),
        }
    }
}

impl CatalogStore for FakeCatalogStore {
    fn read_all(&self) -> Result<Vec<CatalogRow>> {
        self.reads.set(self.reads.get() + 1);
        match &self.failure {
            Some(detail) => Err(anyhow!("{detail}")),
            None => Ok(self.rows.clone()),
        }
    }
}

#[derive(Default)]
pub struct FakeOrderStore {
    pub inserted: RefCell<Vec<NewOrder>>,
    pub failure: Option<String>,
}

impl FakeOrderStore {
    pub fn failing(detail: &str) -> Self {
        Self {
            inserted: RefCell::new(Vec::new()),
            failure: Some(detail.to_string()),
        }
    }

    pub fn insert_count(&self) -> usize {
        self.inserted.borrow().len()
    }
}

impl OrderStore for FakeOrderStore {
    fn insert(&self, order: &NewOrder) -> Result<OrderId> {
        if let Some(detail) = &self.failure {
            return Err(anyhow!("{detail}"));
        }
        let mut inserted = self.inserted.borrow_mut();
        inserted.push(order.clone());
        Ok(inserted.len() as OrderId)
    }
}

/// Answers lookups from a fixed table; unknown keys are `NotFound`.
#[derive(Default)]
pub struct ScriptedNutrition {
    pub responses: BTreeMap<String, EnrichmentResult>,
    pub calls: RefCell<Vec<String>>,
}

impl ScriptedNutrition {
    pub fn found(mut self, search_key: &str) -> Self {
        self.responses.insert(
            search_key.to_string(),
            EnrichmentResult::Success(json!({ "name": search_key, "nutritions": { "sugar": 12.0 } })),
        );
        self
    }

    pub fn failing(mut self, search_key: &str, reason: EnrichmentFailure) -> Self {
        self.responses
            .insert(search_key.to_string(), EnrichmentResult::Failure(reason));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl NutritionSource for ScriptedNutrition {
    fn lookup(&self, search_key: &str) -> EnrichmentResult {
        self.calls.borrow_mut().push(search_key.to_string());
        self.responses
            .get(search_key)
            .cloned()
            .unwrap_or(EnrichmentResult::Failure(EnrichmentFailure::NotFound))
    }
}
