//! CLI argument parsing for the smoothie order tool.
//!
//! The CLI only collects plain values; catalog, selection and commit rules
//! live in the pipeline.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "smoothie",
    version,
    about = "Build smoothie orders from the fruit catalog",
    after_help = "Examples:\n  smoothie init --seed\n  smoothie catalog\n  smoothie order --name \"Mel's Smoothie\" --ingredient Kiwi --ingredient Lime\n  smoothie order --name \"Mel's Smoothie\" --ingredient Kiwi --ingredient Lime --submit",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Path to a JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database holding fruit_options and orders
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Base URL of the nutrition API
    #[arg(long, global = true, value_name = "URL")]
    pub nutrition_url: Option<String>,

    /// Emit debug logs on stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            database: self.db.clone(),
            nutrition_url: self.nutrition_url.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Catalog(CatalogArgs),
    Order(OrderArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Create the fruit_options and orders tables")]
pub struct InitArgs {
    /// Load the standard fruit list into fruit_options
    #[arg(long)]
    pub seed: bool,

    /// Replace existing fruit options when seeding
    #[arg(long, requires = "seed")]
    pub force: bool,
}

#[derive(Parser, Debug)]
#[command(about = "List orderable fruits and their nutrition search keys")]
pub struct CatalogArgs {
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Choose ingredients, show nutrition, and optionally submit the order")]
pub struct OrderArgs {
    /// Name on the order
    #[arg(long, value_name = "LABEL", default_value = "")]
    pub name: String,

    /// Ingredient to add, by catalog name (repeat up to 5 times)
    #[arg(long = "ingredient", value_name = "NAME")]
    pub ingredients: Vec<String>,

    /// Record the order as filled (true) or pending (false)
    #[arg(long, value_name = "BOOL")]
    pub filled: Option<bool>,

    /// Submit the order; without this flag the run is a preview
    #[arg(long)]
    pub submit: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}
