//! Plain-text and JSON rendering of pipeline rows.
use anyhow::{Context, Result};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::pipeline::DisplayRow;

pub fn render_rows(rows: &[DisplayRow]) -> String {
    let mut out = String::new();
    for row in rows {
        match row {
            DisplayRow::Title { text } => {
                push_line(&mut out, text);
                push_line(&mut out, &"=".repeat(text.chars().count()));
            }
            DisplayRow::Info { text } => push_line(&mut out, text),
            DisplayRow::Success { text } => push_line(&mut out, &format!("ok: {text}")),
            DisplayRow::Warning { text } => push_line(&mut out, &format!("warning: {text}")),
            DisplayRow::Error { text } => push_line(&mut out, &format!("error: {text}")),
            DisplayRow::Nutrition {
                ingredient,
                payload,
            } => {
                push_line(&mut out, "");
                push_line(&mut out, &format!("{ingredient} Nutrition Information"));
                let pretty = serde_json::to_string_pretty(payload)
                    .unwrap_or_else(|_| payload.to_string());
                for line in pretty.lines() {
                    push_line(&mut out, &format!("  {line}"));
                }
            }
        }
    }
    out
}

pub fn render_catalog(catalog: &Catalog) -> String {
    let width = catalog
        .entries()
        .iter()
        .map(|entry| entry.display_name.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for entry in catalog.entries() {
        push_line(
            &mut out,
            &format!("{:<width$}  {}", entry.display_name, entry.search_key),
        );
    }
    out
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("serialize JSON output")
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
