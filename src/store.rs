//! Catalog and order stores.
//!
//! The pipeline only sees the `CatalogStore` and `OrderStore` traits. The
//! SQLite implementation opens a connection per operation and drops it before
//! returning, so no session outlives the call that needed it.
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OpenFlags};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::templates;

pub const FRUIT_OPTIONS_TABLE: &str = "fruit_options";
pub const ORDERS_TABLE: &str = "orders";

const FRUIT_NAME_COLUMN: &str = "FRUIT_NAME";
const SEARCH_ON_COLUMN: &str = "SEARCH_ON";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Store-assigned identifier of an inserted order row.
pub type OrderId = i64;

/// One row of `fruit_options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub fruit_name: String,
    pub search_on: Option<String>,
}

/// Column values for one insert into `orders`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub ingredients: String,
    pub name_on_order: String,
    pub order_filled: Option<bool>,
}

pub trait CatalogStore {
    /// Read every row of `fruit_options`.
    fn read_all(&self) -> Result<Vec<CatalogRow>>;
}

pub trait OrderStore {
    /// Insert one row into `orders` and return its id.
    fn insert(&self, order: &NewOrder) -> Result<OrderId>;
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.database.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create both tables if they do not exist yet.
    pub fn init_schema(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        let conn = Connection::open(&self.path)
            .with_context(|| format!("open database {}", self.path.display()))?;
        conn.execute_batch(templates::SCHEMA_SQL)
            .context("create smoothie schema")?;
        Ok(())
    }

    /// Load the standard fruit list into `fruit_options`.
    ///
    /// Refuses to touch a non-empty catalog unless `replace` is set, in which
    /// case existing options are deleted first. Returns the resulting row count.
    pub fn seed_catalog(&self, replace: bool) -> Result<usize> {
        let mut conn = self.open(OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        let tx = conn.transaction().context("begin seed transaction")?;
        let existing = count_rows(&tx, FRUIT_OPTIONS_TABLE)?;
        if existing > 0 {
            if !replace {
                return Err(anyhow!(
                    "{FRUIT_OPTIONS_TABLE} already has {existing} rows (use --force to replace them)"
                ));
            }
            tx.execute(&format!("DELETE FROM {FRUIT_OPTIONS_TABLE}"), [])
                .context("clear fruit options")?;
        }
        tx.execute_batch(templates::SEED_FRUIT_OPTIONS_SQL)
            .context("seed fruit options")?;
        let seeded = count_rows(&tx, FRUIT_OPTIONS_TABLE)?;
        tx.commit().context("commit seed transaction")?;
        Ok(seeded)
    }

    /// Number of rows in `orders`.
    #[cfg(test)]
    pub fn order_count(&self) -> Result<usize> {
        let conn = self.open(OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        count_rows(&conn, ORDERS_TABLE)
    }

    fn open(&self, access: OpenFlags) -> Result<Connection> {
        let flags = access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)
            .with_context(|| format!("open database {}", self.path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("set database busy timeout")?;
        Ok(conn)
    }
}

impl CatalogStore for SqliteStore {
    fn read_all(&self) -> Result<Vec<CatalogRow>> {
        let start = Instant::now();
        let conn = self.open(OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let columns = table_columns(&conn, FRUIT_OPTIONS_TABLE)?;
        if columns.is_empty() {
            return Err(anyhow!("table {FRUIT_OPTIONS_TABLE} not found"));
        }
        let has_column = |name: &str| columns.iter().any(|col| col.eq_ignore_ascii_case(name));
        if !has_column(FRUIT_NAME_COLUMN) {
            return Err(anyhow!(
                "table {FRUIT_OPTIONS_TABLE} has no {FRUIT_NAME_COLUMN} column"
            ));
        }
        let search_on = if has_column(SEARCH_ON_COLUMN) {
            SEARCH_ON_COLUMN
        } else {
            "NULL"
        };
        let sql = format!("SELECT {FRUIT_NAME_COLUMN}, {search_on} FROM {FRUIT_OPTIONS_TABLE}");
        let mut stmt = conn.prepare(&sql).context("prepare catalog query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CatalogRow {
                    fruit_name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    search_on: row.get(1)?,
                })
            })
            .context("query fruit options")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("read fruit options")?;
        let elapsed_ms = start.elapsed().as_millis();
        tracing::info!(elapsed_ms, rows = rows.len(), "catalog read complete");
        Ok(rows)
    }
}

impl OrderStore for SqliteStore {
    fn insert(&self, order: &NewOrder) -> Result<OrderId> {
        let conn = self.open(OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        conn.execute(
            &format!(
                "INSERT INTO {ORDERS_TABLE} (INGREDIENTS, NAME_ON_ORDER, ORDER_FILLED) VALUES (?1, ?2, ?3)"
            ),
            params![order.ingredients, order.name_on_order, order.order_filled],
        )
        .context("insert order")?;
        Ok(conn.last_insert_rowid())
    }
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect table {table}"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("inspect table {table}"))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("read columns of {table}"))?;
    Ok(columns)
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .with_context(|| format!("count rows in {table}"))?;
    Ok(usize::try_from(count).unwrap_or(0))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
