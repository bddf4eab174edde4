//! Order intent construction and commit.
use serde::Serialize;

use crate::error::CommitError;
use crate::nutrition::IngredientLookup;
use crate::selection::Selection;
use crate::store::{NewOrder, OrderId, OrderStore};

/// Separator used when the ingredient list is stored as one column.
pub const INGREDIENT_SEPARATOR: &str = ", ";

/// Whether a failed nutrition lookup keeps an ingredient out of the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionPolicy {
    /// Policy A: the selection is authoritative; nutrition data is informational.
    BestEffort,
    /// Policy B: only ingredients with a successful lookup are ordered.
    VerifiedOnly,
}

/// Inclusion policy for every order this binary commits.
///
/// Best-effort: the nutrition service is not authoritative for what can be
/// ordered, so every validated selection is committed as picked.
pub const ORDER_POLICY: InclusionPolicy = InclusionPolicy::BestEffort;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderIntent {
    pub customer_label: String,
    pub included_ingredients: Vec<String>,
    pub filled: Option<bool>,
}

impl OrderIntent {
    pub fn ingredients_text(&self) -> String {
        self.included_ingredients.join(INGREDIENT_SEPARATOR)
    }
}

/// An intent plus the selected ingredients the policy left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentDraft {
    pub intent: OrderIntent,
    pub excluded: Vec<String>,
}

/// Build the order intent for one run.
///
/// Only ingredients of `selection` can be included, whatever `lookups`
/// contains; under `VerifiedOnly` a selected ingredient without a successful
/// lookup from this run is excluded.
pub fn build_intent(
    policy: InclusionPolicy,
    customer_label: &str,
    selection: &Selection,
    lookups: &[IngredientLookup],
    filled: Option<bool>,
) -> IntentDraft {
    let mut included = Vec::with_capacity(selection.len());
    let mut excluded = Vec::new();
    for ingredient in selection.items() {
        let keep = match policy {
            InclusionPolicy::BestEffort => true,
            InclusionPolicy::VerifiedOnly => lookups
                .iter()
                .any(|lookup| lookup.ingredient == *ingredient && lookup.result.is_success()),
        };
        if keep {
            included.push(ingredient.clone());
        } else {
            excluded.push(ingredient.clone());
        }
    }
    IntentDraft {
        intent: OrderIntent {
            customer_label: customer_label.trim().to_string(),
            included_ingredients: included,
            filled,
        },
        excluded,
    }
}

/// Write the intent to the order store exactly once.
///
/// No retry and no idempotency key: submitting the same intent twice records
/// two orders.
pub fn commit(store: &dyn OrderStore, intent: &OrderIntent) -> Result<OrderId, CommitError> {
    if intent.included_ingredients.is_empty() {
        return Err(CommitError::NoValidIngredients);
    }
    let order = NewOrder {
        ingredients: intent.ingredients_text(),
        name_on_order: intent.customer_label.clone(),
        order_filled: intent.filled,
    };
    let order_id = store
        .insert(&order)
        .map_err(|err| CommitError::Store(format!("{err:#}")))?;
    tracing::info!(
        order_id,
        ingredients = intent.included_ingredients.len(),
        "order committed"
    );
    Ok(order_id)
}

#[cfg(test)]
#[path = "order_tests.rs"]
mod tests;
