//! Tabular (CSV) part lists

use std::io::Read;

use csv::ReaderBuilder;

use crate::core::normalize::RawEntry;

/// Read a CSV part list with a header row; each row becomes one record
/// keyed by header text. Short rows simply lack the trailing fields.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<RawEntry>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();

    let mut entries = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let entry: RawEntry = headers
            .iter()
            .zip(record.iter())
            .filter(|(name, _)| !name.is_empty())
            .collect();
        entries.push(entry);
    }
    Ok(entries)
}
