//! Consolidated BOM output

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};

use crate::core::consolidate::AggregatedEntry;

/// Output columns, in order
pub const COLUMNS: [&str; 10] = [
    "parttype",
    "value",
    "spec",
    "quantity",
    "info",
    "order code",
    "part number",
    "mouser",
    "farnell",
    "other",
];

/// Cells of one output row, matching [`COLUMNS`]
pub fn row(entry: &AggregatedEntry) -> [String; 10] {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    [
        entry.parttype.clone(),
        entry.value.clone(),
        opt(&entry.spec),
        entry.quantity.to_string(),
        String::new(),
        String::new(),
        entry.part_number.clone(),
        opt(&entry.mouser),
        opt(&entry.farnell),
        opt(&entry.other),
    ]
}

/// Write the BOM as CSV to any writer
pub fn write_bom_to<W: Write>(writer: W, entries: &[AggregatedEntry]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS).into_diagnostic()?;
    for entry in entries {
        wtr.write_record(row(entry)).into_diagnostic()?;
    }
    wtr.flush().into_diagnostic()?;
    Ok(())
}

/// Output path actually written for a requested path (always `.csv`)
pub fn output_path(requested: &Path) -> PathBuf {
    requested.with_extension("csv")
}

/// Write the BOM to a CSV file, returning the path written
pub fn write_bom(requested: &Path, entries: &[AggregatedEntry]) -> Result<PathBuf> {
    let path = output_path(requested);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }
    }

    let file = File::create(&path).into_diagnostic()?;
    write_bom_to(file, entries)?;

    tracing::info!(path = %path.display(), lines = entries.len(), "wrote BOM");
    Ok(path)
}
