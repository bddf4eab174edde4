use super::*;
use crate::error::EnrichmentFailure;
use crate::test_support::{FakeCatalogStore, FakeOrderStore, ScriptedNutrition};

fn request(names: &[&str], submit: bool) -> OrderRequest {
    OrderRequest {
        customer_label: "Mel's Smoothie".to_string(),
        ingredients: names.iter().map(|name| name.to_string()).collect(),
        filled: None,
        submit,
    }
}

fn has_error_row(outcome: &PipelineOutcome) -> bool {
    outcome
        .rows
        .iter()
        .any(|row| matches!(row, DisplayRow::Error { .. }))
}

#[test]
fn two_known_fruits_with_nutrition_commit_in_order() {
    let catalog = FakeCatalogStore::with(&[("Banana", "banana"), ("Strawberry", "strawberry")]);
    let orders = FakeOrderStore::default();
    let nutrition = ScriptedNutrition::default().found("banana").found("strawberry");
    let assembler = OrderAssembler::new(&catalog, &orders, &nutrition);

    let outcome = assembler.run(&request(&["Banana", "Strawberry"], true));

    assert_eq!(outcome.state, RunState::Committed);
    assert_eq!(outcome.order_id, Some(1));
    let intent = outcome.intent.as_ref().expect("intent");
    assert_eq!(intent.included_ingredients, vec!["Banana", "Strawberry"]);
    assert_eq!(orders.inserted.borrow()[0].ingredients, "Banana, Strawberry");
    let nutrition_rows: Vec<&str> = outcome
        .rows
        .iter()
        .filter_map(|row| match row {
            DisplayRow::Nutrition { ingredient, .. } => Some(ingredient.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(nutrition_rows, vec!["Banana", "Strawberry"]);
    assert!(!outcome.is_error());
}

#[test]
fn unknown_fruit_rejects_selection_without_commit() {
    let catalog = FakeCatalogStore::with(&[("Banana", "banana")]);
    let orders = FakeOrderStore::default();
    let nutrition = ScriptedNutrition::default().found("banana");
    let assembler = OrderAssembler::new(&catalog, &orders, &nutrition);

    let outcome = assembler.run(&request(&["Banana", "Mango"], true));

    assert_eq!(outcome.state, RunState::SelectionRejected);
    assert!(has_error_row(&outcome));
    assert!(outcome.intent.is_none());
    assert!(nutrition.calls().is_empty());
    assert_eq!(orders.insert_count(), 0);
}

#[test]
fn not_found_under_verified_only_refuses_commit() {
    let catalog = FakeCatalogStore::with(&[("Banana", "banana")]);
    let orders = FakeOrderStore::default();
    let nutrition =
        ScriptedNutrition::default().failing("banana", EnrichmentFailure::NotFound);
    let assembler = OrderAssembler::new(&catalog, &orders, &nutrition)
        .with_policy(InclusionPolicy::VerifiedOnly);

    let outcome = assembler.run(&request(&["Banana"], true));

    assert_eq!(outcome.state, RunState::CommitFailed);
    let intent = outcome.intent.as_ref().expect("intent");
    assert!(intent.included_ingredients.is_empty());
    assert!(outcome.rows.iter().any(|row| matches!(
        row,
        DisplayRow::Error { text } if text.contains("no valid ingredients to commit")
    )));
    assert!(outcome.rows.iter().any(|row| matches!(
        row,
        DisplayRow::Warning { text } if text.starts_with("Banana left out")
    )));
    assert_eq!(orders.insert_count(), 0);
}

#[test]
fn not_found_under_best_effort_still_commits() {
    let catalog = FakeCatalogStore::with(&[("Banana", "banana")]);
    let orders = FakeOrderStore::default();
    let nutrition =
        ScriptedNutrition::default().failing("banana", EnrichmentFailure::NotFound);
    let assembler = OrderAssembler::new(&catalog, &orders, &nutrition);

    let outcome = assembler.run(&request(&["Banana"], true));

    assert_eq!(outcome.policy, InclusionPolicy::BestEffort);
    assert_eq!(outcome.state, RunState::Committed);
    assert_eq!(
        outcome.intent.expect("intent").included_ingredients,
        vec!["Banana"]
    );
    assert_eq!(orders.insert_count(), 1);
}

#[test]
fn empty_selection_is_informational_only() {
    let catalog = FakeCatalogStore::with(&[("Banana", "banana")]);
    let orders = FakeOrderStore::default();
    let nutrition = ScriptedNutrition::default();
    let assembler = OrderAssembler::new(&catalog, &orders, &nutrition);

    let outcome = assembler.run(&request(&[], true));

    assert_eq!(outcome.state, RunState::NothingSelected);
    assert!(!outcome.is_error());
    assert!(outcome.rows.iter().any(|row| matches!(
        row,
        DisplayRow::Info { text } if text.starts_with("Select up to 5 ingredients")
    )));
    assert!(nutrition.calls().is_empty());
    assert_eq!(orders.insert_count(), 0);
    assert_eq!(outcome.options, vec!["Banana"]);
}

#[test]
fn unavailable_catalog_stops_the_run() {
    let catalog = FakeCatalogStore::unreachable("no such table: fruit_options");
    let orders = FakeOrderStore::default();
    let nutrition = ScriptedNutrition::default();
    let assembler = OrderAssembler::new(&catalog, &orders, &nutrition);

    let outcome = assembler.run(&request(&["Banana"], true));

    assert_eq!(outcome.state, RunState::CatalogUnavailable);
    assert!(outcome.options.is_empty());
    assert!(outcome.rows.iter().any(|row| matches!(
        row,
        DisplayRow::Error { text } if text.contains("no such table")
    )));
    assert!(nutrition.calls().is_empty());
    assert_eq!(orders.insert_count(), 0);
}

#[test]
fn preview_never_commits() {
    let catalog = FakeCatalogStore::with(&[("Kiwi", "kiwi")]);
    let orders = FakeOrderStore::default();
    let nutrition = ScriptedNutrition::default().found("kiwi");
    let assembler = OrderAssembler::new(&catalog, &orders, &nutrition);

    let outcome = assembler.run(&request(&["Kiwi"], false));

    assert_eq!(outcome.state, RunState::Previewed);
    assert!(outcome.intent.is_some());
    assert_eq!(outcome.order_id, None);
    assert_eq!(orders.insert_count(), 0);
}

#[test]
fn store_failure_is_reported_with_detail() {
    let catalog = FakeCatalogStore::with(&[("Kiwi", "kiwi")]);
    let orders = FakeOrderStore::failing("disk I/O error");
    let nutrition = ScriptedNutrition::default().found("kiwi");
    let assembler = OrderAssembler::new(&catalog, &orders, &nutrition);

    let outcome = assembler.run(&request(&["Kiwi"], true));

    assert_eq!(outcome.state, RunState::CommitFailed);
    assert!(outcome.is_error());
    assert!(outcome.rows.iter().any(|row| matches!(
        row,
        DisplayRow::Error { text } if text == "Error submitting the order: disk I/O error"
    )));
}

#[test]
fn each_run_reloads_the_catalog() {
    let catalog = FakeCatalogStore::with(&[("Kiwi", "kiwi")]);
    let orders = FakeOrderStore::default();
    let nutrition = ScriptedNutrition::default().found("kiwi");
    let assembler = OrderAssembler::new(&catalog, &orders, &nutrition);

    assembler.run(&request(&["Kiwi"], false));
    assembler.run(&request(&["Kiwi"], false));
    assert_eq!(catalog.reads.get(), 2);
}
