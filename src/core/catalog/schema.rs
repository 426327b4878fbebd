//! Catalog schema setup and teardown

use miette::{IntoDiagnostic, Result};

use super::ComponentCatalog;

impl ComponentCatalog {
    /// Create the catalog tables if they do not exist
    pub fn setup(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            -- Canonical components
            CREATE TABLE IF NOT EXISTS components (
                partnumber TEXT PRIMARY KEY NOT NULL,
                parttype TEXT NOT NULL,
                footprint TEXT,
                value TEXT,
                tolerance TEXT,
                power_rating TEXT,
                voltage TEXT,
                spec TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_components_value ON components(value);

            -- Supplier order codes, one row per part number
            CREATE TABLE IF NOT EXISTS order_numbers (
                partnumber TEXT NOT NULL,
                mouser TEXT,
                farnell TEXT,
                other TEXT,
                PRIMARY KEY (partnumber)
            );
            "#,
            )
            .into_diagnostic()?;

        Ok(())
    }

    /// Drop all catalog tables
    pub fn cleanup(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                DROP TABLE IF EXISTS components;
                DROP TABLE IF EXISTS order_numbers;
                "#,
            )
            .into_diagnostic()?;

        Ok(())
    }
}
