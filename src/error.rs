//! Typed failures for each order pipeline stage.
//!
//! Stage functions return these instead of `anyhow::Error` so the pipeline can
//! map every outcome onto a render row without string matching.
use serde::Serialize;
use thiserror::Error;

/// The catalog store could not be read or lacks the expected columns.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("catalog unavailable: {detail}")]
pub struct CatalogUnavailable {
    pub detail: String,
}

/// A raw selection that cannot become a `Selection`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{0:?} is not on the ingredient list")]
    UnknownIngredient(String),
    #[error("choose up to {limit} ingredients (got {requested})")]
    TooMany { limit: usize, requested: usize },
    #[error("{0:?} is already selected")]
    Duplicate(String),
}

/// Why a nutrition lookup produced no payload.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentFailure {
    #[error("not found")]
    NotFound,
    #[error("transport error")]
    TransportError,
    #[error("malformed response")]
    Malformed,
}

/// An order that was not recorded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitError {
    #[error("no valid ingredients to commit")]
    NoValidIngredients,
    #[error("{0}")]
    Store(String),
}
