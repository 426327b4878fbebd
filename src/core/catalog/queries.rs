//! Catalog lookups
//!
//! Every lookup inner-joins components with their order codes, so a
//! component without an order-code row is never returned.

use miette::{IntoDiagnostic, Result};
use rusqlite::{params, OptionalExtension, Row};

use super::{ComponentCatalog, ComponentQuery, ComponentRecord, OrderCodes};

const SELECT_JOINED: &str = r#"SELECT c.partnumber, c.parttype, c.footprint, c.value, c.tolerance,
              c.power_rating, c.voltage, c.spec, o.mouser, o.farnell, o.other
       FROM components AS c
       JOIN order_numbers AS o ON c.partnumber = o.partnumber"#;

impl ComponentCatalog {
    /// Find components by exact part number
    pub fn find_by_partnumber(&self, partnumber: &str) -> Result<Vec<ComponentRecord>> {
        let sql = format!("{} WHERE c.partnumber = ?1", SELECT_JOINED);
        let mut stmt = self.conn.prepare(&sql).into_diagnostic()?;

        let rows = stmt
            .query_map(params![partnumber], row_to_record)
            .into_diagnostic()?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .into_diagnostic()
    }

    /// Find components by partial attribute match
    ///
    /// Each active optional filter becomes `(col = ? OR col IS NULL)`, so an
    /// unset catalog attribute matches whatever the query asks for.
    pub fn find(&self, query: &ComponentQuery) -> Result<Vec<ComponentRecord>> {
        let mut sql = format!("{} WHERE c.value = ?", SELECT_JOINED);
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(query.value.clone())];

        for (column, requested) in query.active_filters() {
            sql.push_str(&format!(" AND (c.{col} = ? OR c.{col} IS NULL)", col = column));
            params_vec.push(Box::new(requested.to_string()));
        }

        sql.push_str(" ORDER BY c.partnumber");

        let mut stmt = self.conn.prepare(&sql).into_diagnostic()?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(params_refs.as_slice(), row_to_record)
            .into_diagnostic()?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .into_diagnostic()
    }

    /// Get the order codes stored for a part number
    pub fn order_codes(&self, partnumber: &str) -> Result<Option<OrderCodes>> {
        self.conn
            .query_row(
                "SELECT mouser, farnell, other FROM order_numbers WHERE partnumber = ?1",
                params![partnumber],
                |row| {
                    Ok(OrderCodes {
                        mouser: row.get(0)?,
                        farnell: row.get(1)?,
                        other: row.get(2)?,
                    })
                },
            )
            .optional()
            .into_diagnostic()
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ComponentRecord> {
    Ok(ComponentRecord {
        partnumber: row.get(0)?,
        parttype: row.get(1)?,
        footprint: row.get(2)?,
        value: row.get(3)?,
        tolerance: row.get(4)?,
        power_rating: row.get(5)?,
        voltage: row.get(6)?,
        spec: row.get(7)?,
        order_codes: OrderCodes {
            mouser: row.get(8)?,
            farnell: row.get(9)?,
            other: row.get(10)?,
        },
    })
}
