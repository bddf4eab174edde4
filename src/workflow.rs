use anyhow::Result;
use std::process::ExitCode;

use crate::catalog::load_catalog;
use crate::cli::{CatalogArgs, InitArgs, OrderArgs};
use crate::config::AppConfig;
use crate::nutrition::HttpNutritionClient;
use crate::output::{render_catalog, render_rows, to_json};
use crate::pipeline::{OrderAssembler, OrderRequest};
use crate::store::SqliteStore;

pub fn run_init(config: &AppConfig, args: InitArgs) -> Result<ExitCode> {
    let store = SqliteStore::from_config(config);
    store.init_schema()?;
    println!("Initialized {}", store.path().display());
    if args.seed {
        let count = store.seed_catalog(args.force)?;
        println!("Seeded {count} fruit options.");
    }
    Ok(ExitCode::SUCCESS)
}

pub fn run_catalog(config: &AppConfig, args: CatalogArgs) -> Result<ExitCode> {
    let store = SqliteStore::from_config(config);
    let catalog = match load_catalog(&store) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("error: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };
    if args.json {
        println!("{}", to_json(&catalog)?);
    } else if catalog.is_empty() {
        println!("No fruit options are available yet.");
    } else {
        print!("{}", render_catalog(&catalog));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn run_order(config: &AppConfig, args: OrderArgs) -> Result<ExitCode> {
    let store = SqliteStore::from_config(config);
    let nutrition = HttpNutritionClient::from_config(&config.nutrition)?;
    let assembler = OrderAssembler::new(&store, &store, &nutrition);
    let request = OrderRequest {
        customer_label: args.name,
        ingredients: args.ingredients,
        filled: args.filled,
        submit: args.submit,
    };

    let outcome = assembler.run(&request);
    if args.json {
        println!("{}", to_json(&outcome)?);
    } else {
        print!("{}", render_rows(&outcome.rows));
    }
    if outcome.is_error() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
