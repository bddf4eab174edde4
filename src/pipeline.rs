//! The order pipeline: catalog load, bounded selection, enrichment, commit.
//!
//! `OrderAssembler::run` takes plain request values and returns plain render
//! rows. Every run starts from a fresh catalog read and owns its selection,
//! lookups and intent; nothing is carried over between runs.
use serde::Serialize;
use serde_json::Value;

use crate::catalog::load_catalog;
use crate::error::SelectionError;
use crate::nutrition::{enrich, EnrichmentResult, IngredientLookup, NutritionSource};
use crate::order::{build_intent, commit, InclusionPolicy, OrderIntent, ORDER_POLICY};
use crate::selection::{apply_selection, MAX_SELECTIONS};
use crate::store::{CatalogStore, OrderId, OrderStore};

/// User input for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct OrderRequest {
    pub customer_label: String,
    pub ingredients: Vec<String>,
    pub filled: Option<bool>,
    /// Explicit confirmation; without it the run stops before commit.
    pub submit: bool,
}

/// One line of output for whatever surface displays the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayRow {
    Title { text: String },
    Info { text: String },
    Success { text: String },
    Warning { text: String },
    Error { text: String },
    Nutrition { ingredient: String, payload: Value },
}

/// Where a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    CatalogUnavailable,
    NothingSelected,
    SelectionRejected,
    Previewed,
    Committed,
    CommitFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub state: RunState,
    pub policy: InclusionPolicy,
    /// Options the user may pick from; empty when the catalog is unavailable.
    pub options: Vec<String>,
    pub selection: Vec<String>,
    pub lookups: Vec<IngredientLookup>,
    pub intent: Option<OrderIntent>,
    pub order_id: Option<OrderId>,
    pub rows: Vec<DisplayRow>,
}

impl PipelineOutcome {
    fn new(policy: InclusionPolicy) -> Self {
        Self {
            state: RunState::NothingSelected,
            policy,
            options: Vec::new(),
            selection: Vec::new(),
            lookups: Vec::new(),
            intent: None,
            order_id: None,
            rows: Vec::new(),
        }
    }

    /// True when the run ended on an error row.
    pub fn is_error(&self) -> bool {
        matches!(
            self.state,
            RunState::CatalogUnavailable | RunState::SelectionRejected | RunState::CommitFailed
        )
    }

    fn finish(mut self, state: RunState) -> Self {
        self.state = state;
        tracing::debug!(state = ?state, rows = self.rows.len(), "pipeline run finished");
        self
    }
}

pub struct OrderAssembler<'a> {
    catalog_store: &'a dyn CatalogStore,
    order_store: &'a dyn OrderStore,
    nutrition: &'a dyn NutritionSource,
    policy: InclusionPolicy,
}

impl<'a> OrderAssembler<'a> {
    pub fn new(
        catalog_store: &'a dyn CatalogStore,
        order_store: &'a dyn OrderStore,
        nutrition: &'a dyn NutritionSource,
    ) -> Self {
        Self {
            catalog_store,
            order_store,
            nutrition,
            policy: ORDER_POLICY,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_policy(mut self, policy: InclusionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn run(&self, request: &OrderRequest) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::new(self.policy);
        let label = request.customer_label.trim();
        outcome.rows.push(DisplayRow::Title {
            text: "Customize your Smoothie!".to_string(),
        });
        outcome.rows.push(DisplayRow::Info {
            text: format!("The name of your Smoothie will be: {label}"),
        });

        let catalog = match load_catalog(self.catalog_store) {
            Ok(catalog) => catalog,
            Err(err) => {
                outcome.rows.push(DisplayRow::Error {
                    text: format!("Error fetching fruit options: {}", err.detail),
                });
                return outcome.finish(RunState::CatalogUnavailable);
            }
        };
        outcome.options = catalog.display_names();
        if catalog.is_empty() {
            outcome.rows.push(DisplayRow::Info {
                text: "No fruit options are available yet.".to_string(),
            });
        }

        let selection = match apply_selection(&catalog, &request.ingredients) {
            Ok(selection) => selection,
            Err(err) => {
                outcome.rows.push(DisplayRow::Error {
                    text: selection_message(&err),
                });
                return outcome.finish(RunState::SelectionRejected);
            }
        };
        if selection.is_empty() {
            outcome.rows.push(DisplayRow::Info {
                text: format!(
                    "Select up to {MAX_SELECTIONS} ingredients to create your smoothie."
                ),
            });
            return outcome.finish(RunState::NothingSelected);
        }
        outcome.selection = selection.items().to_vec();

        let lookups = enrich(&selection, &catalog, self.nutrition);
        push_lookup_rows(&mut outcome.rows, &lookups);

        let draft = build_intent(
            self.policy,
            label,
            &selection,
            &lookups,
            request.filled,
        );
        outcome.lookups = lookups;
        for ingredient in &draft.excluded {
            outcome.rows.push(DisplayRow::Warning {
                text: format!("{ingredient} left out of the order: no nutrition information"),
            });
        }
        let intent = draft.intent;

        if !request.submit {
            let text = if intent.included_ingredients.is_empty() {
                "No valid ingredients to order.".to_string()
            } else {
                format!(
                    "Ready to order '{}' with: {}. Confirm to submit.",
                    intent.customer_label,
                    intent.ingredients_text()
                )
            };
            outcome.rows.push(DisplayRow::Info { text });
            outcome.intent = Some(intent);
            return outcome.finish(RunState::Previewed);
        }

        let state = match commit(self.order_store, &intent) {
            Ok(order_id) => {
                outcome.rows.push(DisplayRow::Success {
                    text: format!(
                        "Your Smoothie '{}' is ordered with the following ingredients: {}! (order #{order_id})",
                        intent.customer_label,
                        intent.ingredients_text()
                    ),
                });
                outcome.order_id = Some(order_id);
                RunState::Committed
            }
            Err(err) => {
                outcome.rows.push(DisplayRow::Error {
                    text: format!("Error submitting the order: {err}"),
                });
                RunState::CommitFailed
            }
        };
        outcome.intent = Some(intent);
        outcome.finish(state)
    }
}

fn selection_message(err: &SelectionError) -> String {
    match err {
        SelectionError::UnknownIngredient(_) | SelectionError::Duplicate(_) => {
            format!("Invalid selection: {err}.")
        }
        SelectionError::TooMany { .. } => format!("Too many ingredients: {err}."),
    }
}

fn push_lookup_rows(rows: &mut Vec<DisplayRow>, lookups: &[IngredientLookup]) {
    for lookup in lookups {
        match &lookup.result {
            EnrichmentResult::Success(payload) => rows.push(DisplayRow::Nutrition {
                ingredient: lookup.ingredient.clone(),
                payload: payload.clone(),
            }),
            EnrichmentResult::Failure(reason) => rows.push(DisplayRow::Warning {
                text: format!(
                    "Nutrition information for {} is unavailable ({reason}).",
                    lookup.ingredient
                ),
            }),
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
