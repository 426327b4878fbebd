//! Catalog population
//!
//! Upserts keyed on part number, fed one supplier-data row at a time. A full
//! rebuild drops the schema and reloads it inside a single transaction, so
//! a source that cannot be read leaves the previous catalog untouched.

use std::collections::HashMap;
use std::io::Read;

use csv::ReaderBuilder;
use miette::{IntoDiagnostic, Result};
use rusqlite::params;

use super::{tidy_attribute, tidy_order_code, ComponentCatalog, ComponentRecord, ImportStats, OrderCodes};

/// What happened to a single import row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Imported,
    /// Blank part number
    Skipped,
    /// Unusable row (e.g. blank part type)
    Rejected,
}

impl ComponentCatalog {
    /// Insert or replace a component's attributes
    pub fn add_component(&self, record: &ComponentRecord) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO components VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.partnumber,
                    record.parttype,
                    record.footprint,
                    record.value,
                    record.tolerance,
                    record.power_rating,
                    record.voltage,
                    record.spec,
                ],
            )
            .into_diagnostic()?;
        Ok(())
    }

    /// Insert or replace the order codes for a part number
    pub fn add_order_numbers(&self, partnumber: &str, codes: &OrderCodes) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO order_numbers VALUES (?1, ?2, ?3, ?4)",
                params![partnumber, codes.mouser, codes.farnell, codes.other],
            )
            .into_diagnostic()?;
        Ok(())
    }

    /// Import one supplier-data row, keyed by lowercase column name
    ///
    /// Attributes are trimmed and lowercased; supplier codes are only
    /// trimmed. An order-code row is always written for an imported
    /// component, even when every supplier column is blank.
    pub fn load_row(&self, row: &HashMap<String, String>) -> Result<RowOutcome> {
        let attr = |name: &str| tidy_attribute(row.get(name).map(String::as_str));

        let Some(partnumber) = attr("partnumber") else {
            tracing::warn!(row = ?row, "skipping component without part number");
            return Ok(RowOutcome::Skipped);
        };
        let Some(parttype) = attr("parttype") else {
            tracing::warn!(partnumber = %partnumber, "rejecting component without part type");
            return Ok(RowOutcome::Rejected);
        };

        let record = ComponentRecord {
            partnumber,
            parttype,
            footprint: attr("footprint"),
            value: attr("value"),
            tolerance: attr("tolerance"),
            power_rating: attr("power_rating"),
            voltage: attr("voltage"),
            spec: attr("spec"),
            order_codes: OrderCodes::default(),
        };
        self.add_component(&record)?;

        let code = |name: &str| tidy_order_code(row.get(name).map(String::as_str));
        let codes = OrderCodes {
            mouser: code("mouser"),
            farnell: code("farnell"),
            other: code("other"),
        };
        self.add_order_numbers(&record.partnumber, &codes)?;

        Ok(RowOutcome::Imported)
    }

    /// Replace the whole catalog with the rows of a supplier-data CSV
    ///
    /// Teardown, schema creation and every row share one transaction; any
    /// error rolls all of it back.
    pub fn rebuild_from_csv<R: Read>(&self, reader: R) -> Result<ImportStats> {
        let mut stats = ImportStats::default();

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().into_diagnostic()?.clone();
        let header_names: Vec<String> = headers.iter().map(normalize_header).collect();

        let tx = self.conn.unchecked_transaction().into_diagnostic()?;
        self.cleanup()?;
        self.setup()?;

        for (row_idx, result) in rdr.records().enumerate() {
            let row_num = row_idx + 2;
            stats.rows_processed += 1;

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(row = row_num, error = %e, "CSV parse error");
                    stats.errors += 1;
                    continue;
                }
            };

            let row: HashMap<String, String> = header_names
                .iter()
                .cloned()
                .zip(record.iter().map(String::from))
                .collect();

            match self.load_row(&row)? {
                RowOutcome::Imported => stats.imported += 1,
                RowOutcome::Skipped => stats.skipped += 1,
                RowOutcome::Rejected => stats.errors += 1,
            }
        }

        tx.commit().into_diagnostic()?;
        Ok(stats)
    }
}

/// Column names are matched case-insensitively, spaces as underscores
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_row_tidies_attributes() {
        let catalog = ComponentCatalog::open_in_memory().unwrap();
        let outcome = catalog
            .load_row(&row(&[
                ("partnumber", " CRCW060310K0 "),
                ("parttype", "Resistor"),
                ("value", "10K"),
                ("tolerance", ""),
                ("mouser", " 71-CRCW0603-10K "),
            ]))
            .unwrap();
        assert_eq!(outcome, RowOutcome::Imported);

        let found = catalog.find_by_partnumber("crcw060310k0").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].parttype, "resistor");
        assert_eq!(found[0].value.as_deref(), Some("10k"));
        assert_eq!(found[0].tolerance, None);
        assert_eq!(found[0].order_codes.mouser.as_deref(), Some("71-CRCW0603-10K"));
    }

    #[test]
    fn test_load_row_skips_blank_partnumber() {
        let catalog = ComponentCatalog::open_in_memory().unwrap();
        let outcome = catalog
            .load_row(&row(&[("partnumber", "  "), ("parttype", "resistor")]))
            .unwrap();
        assert_eq!(outcome, RowOutcome::Skipped);
        assert_eq!(catalog.statistics().unwrap().total_components, 0);
    }

    #[test]
    fn test_load_row_rejects_blank_parttype() {
        let catalog = ComponentCatalog::open_in_memory().unwrap();
        let outcome = catalog.load_row(&row(&[("partnumber", "x1")])).unwrap();
        assert_eq!(outcome, RowOutcome::Rejected);
        assert_eq!(catalog.statistics().unwrap().total_components, 0);
    }

    #[test]
    fn test_load_row_always_writes_order_codes() {
        let catalog = ComponentCatalog::open_in_memory().unwrap();
        catalog
            .load_row(&row(&[("partnumber", "d1"), ("parttype", "diode"), ("value", "1n4148")]))
            .unwrap();

        let codes = catalog.order_codes("d1").unwrap().unwrap();
        assert!(codes.is_empty());
        assert_eq!(catalog.find_by_partnumber("d1").unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_replaces_by_partnumber() {
        let catalog = ComponentCatalog::open_in_memory().unwrap();
        catalog
            .load_row(&row(&[("partnumber", "c1"), ("parttype", "capacitor"), ("value", "10nf")]))
            .unwrap();
        catalog
            .load_row(&row(&[
                ("partnumber", "c1"),
                ("parttype", "capacitor"),
                ("value", "100nf"),
                ("farnell", "1414664"),
            ]))
            .unwrap();

        let found = catalog.find_by_partnumber("c1").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value.as_deref(), Some("100nf"));
        assert_eq!(found[0].order_codes.farnell.as_deref(), Some("1414664"));
    }

    #[test]
    fn test_import_csv() {
        let data = "\
partnumber, parttype, value, tolerance, power rating, mouser, farnell, other
crcw060310k0, resistor, 10k, 1%, 0.1w, 71-CRCW0603-10K, ,
, resistor, 22k, , , , ,
grm188r71h104, capacitor, 100nf, , , 81-GRM188R71H104KA3D, 1828906,
x9, , 1k, , , , ,
";
        let catalog = ComponentCatalog::open_in_memory().unwrap();
        let stats = catalog.rebuild_from_csv(data.as_bytes()).unwrap();

        assert_eq!(stats.rows_processed, 4);
        assert_eq!(stats.imported, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.errors, 1);

        let found = catalog.find_by_partnumber("crcw060310k0").unwrap();
        assert_eq!(found[0].power_rating.as_deref(), Some("0.1w"));
        assert_eq!(found[0].order_codes.farnell, None);
    }

    #[test]
    fn test_rebuild_discards_previous_records() {
        let catalog = ComponentCatalog::open_in_memory().unwrap();
        catalog
            .load_row(&row(&[("partnumber", "r1"), ("parttype", "resistor"), ("value", "10k")]))
            .unwrap();

        catalog
            .rebuild_from_csv("partnumber,parttype,value\nc1,capacitor,10nf\n".as_bytes())
            .unwrap();

        let stats = catalog.statistics().unwrap();
        assert_eq!(stats.total_components, 1);
        assert_eq!(stats.total_order_codes, 1);
        assert!(catalog.find_by_partnumber("r1").unwrap().is_empty());
    }

    #[test]
    fn test_rebuild_with_unreadable_header_keeps_catalog() {
        let catalog = ComponentCatalog::open_in_memory().unwrap();
        catalog
            .load_row(&row(&[("partnumber", "r1"), ("parttype", "resistor"), ("value", "10k")]))
            .unwrap();

        let data: &[u8] = b"part\xffnumber,parttype\nr2,resistor\n";
        assert!(catalog.rebuild_from_csv(data).is_err());

        assert_eq!(catalog.statistics().unwrap().total_components, 1);
        assert_eq!(catalog.find_by_partnumber("r1").unwrap().len(), 1);
    }
}
