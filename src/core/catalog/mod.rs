//! SQLite-backed component catalog
//!
//! The catalog holds canonical component records keyed by part number,
//! joined with one supplier order-code row per part number. It is:
//! - populated by a destructive rebuild (`update`), one upsert per import row
//! - queried read-only while consolidating part lists
//!
//! Lookups go through the [`ComponentSource`] trait so the consolidation
//! engine can run against [`MemoryCatalog`] in tests.

mod import;
mod memory;
mod queries;
mod schema;
mod types;

pub use import::RowOutcome;
pub use memory::MemoryCatalog;
pub use types::*;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use rusqlite::Connection;

/// Default catalog location, relative to the working directory
pub const DEFAULT_CATALOG_PATH: &str = "dbs/components.db";

/// Read access to a component catalog
pub trait ComponentSource {
    /// Exact lookup by part number (0 or 1 results expected, not enforced)
    fn find_by_partnumber(&self, partnumber: &str) -> Result<Vec<ComponentRecord>>;

    /// Partial attribute lookup with unset-as-wildcard semantics
    fn find(&self, query: &ComponentQuery) -> Result<Vec<ComponentRecord>>;
}

/// The persisted catalog
pub struct ComponentCatalog {
    conn: Connection,
    path: Option<PathBuf>,
}

impl ComponentCatalog {
    /// Open (or create) the catalog file and make sure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).into_diagnostic()?;
            }
        }

        let conn = Connection::open(path).into_diagnostic()?;
        let catalog = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        catalog.setup()?;

        tracing::debug!(path = %path.display(), "opened component catalog");
        Ok(catalog)
    }

    /// Open a throwaway catalog (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().into_diagnostic()?;
        let catalog = Self { conn, path: None };
        catalog.setup()?;
        Ok(catalog)
    }

    /// Location of the catalog file, if it is file-backed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get catalog statistics
    pub fn statistics(&self) -> Result<CatalogStats> {
        let total_components: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM components", [], |row| row.get(0))
            .into_diagnostic()?;

        let total_order_codes: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM order_numbers", [], |row| row.get(0))
            .into_diagnostic()?;

        let mut by_parttype = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT parttype, COUNT(*) FROM components GROUP BY parttype")
                .into_diagnostic()?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
                })
                .into_diagnostic()?;

            for row in rows {
                let (parttype, count) = row.into_diagnostic()?;
                by_parttype.insert(parttype, count);
            }
        }

        let db_size_bytes = self
            .path
            .as_ref()
            .and_then(|p| fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(CatalogStats {
            total_components,
            total_order_codes,
            by_parttype,
            db_size_bytes,
        })
    }

    /// Execute raw SQL query (read-only)
    pub fn query_raw(&self, sql: &str) -> Result<Vec<Vec<String>>> {
        let mut stmt = self.conn.prepare(sql).into_diagnostic()?;
        if !stmt.readonly() {
            return Err(miette::miette!("Only read-only queries are allowed"));
        }
        let column_count = stmt.column_count();

        let rows = stmt
            .query_map([], |row| {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    let value: String = row
                        .get::<_, rusqlite::types::Value>(i)
                        .map(|v| match v {
                            rusqlite::types::Value::Null => "NULL".to_string(),
                            rusqlite::types::Value::Integer(i) => i.to_string(),
                            rusqlite::types::Value::Real(f) => f.to_string(),
                            rusqlite::types::Value::Text(s) => s,
                            rusqlite::types::Value::Blob(_) => "<blob>".to_string(),
                        })
                        .unwrap_or_default();
                    values.push(value);
                }
                Ok(values)
            })
            .into_diagnostic()?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .into_diagnostic()
    }

    /// Get column names for a query
    pub fn query_columns(&self, sql: &str) -> Result<Vec<String>> {
        let stmt = self.conn.prepare(sql).into_diagnostic()?;
        Ok(stmt.column_names().iter().map(|s| s.to_string()).collect())
    }
}

impl ComponentSource for ComponentCatalog {
    fn find_by_partnumber(&self, partnumber: &str) -> Result<Vec<ComponentRecord>> {
        ComponentCatalog::find_by_partnumber(self, partnumber)
    }

    fn find(&self, query: &ComponentQuery) -> Result<Vec<ComponentRecord>> {
        ComponentCatalog::find(self, query)
    }
}

// Attributes tidy the same way as part-list fields
pub(crate) use crate::core::normalize::tidy_value as tidy_attribute;

/// Trim a supplier code, keeping its case; blank becomes unset
pub(crate) fn tidy_order_code(raw: Option<&str>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
