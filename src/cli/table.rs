//! Table formatting for command output
//!
//! Every listing (the consolidated BOM, catalog lookups, raw queries) is a
//! header plus string rows, rendered here in the selected [`OutputFormat`].

use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, to_json};
use crate::cli::OutputFormat;

/// Render rows under the given column names
pub fn render<S: AsRef<str>>(
    columns: &[S],
    rows: &[Vec<String>],
    format: OutputFormat,
) -> miette::Result<String> {
    let header: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();

    let out = match format {
        OutputFormat::Auto | OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(header);
            for row in rows {
                builder.push_record(row.clone());
            }
            let mut table = builder.build();
            if format == OutputFormat::Md {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            format!("{}\n", table)
        }
        OutputFormat::Tsv => join_lines(&header, rows, "\t", |s| s.replace(['\t', '\n'], " ")),
        OutputFormat::Csv => join_lines(&header, rows, ",", escape_csv),
        OutputFormat::Json => {
            let objects: Vec<serde_json::Map<String, serde_json::Value>> = rows
                .iter()
                .map(|row| {
                    header
                        .iter()
                        .zip(row)
                        .map(|(col, val)| (col.clone(), serde_json::Value::String(val.clone())))
                        .collect()
                })
                .collect();
            format!("{}\n", to_json(&objects)?)
        }
    };
    Ok(out)
}

fn join_lines(
    header: &[String],
    rows: &[Vec<String>],
    sep: &str,
    escape: impl Fn(&str) -> String,
) -> String {
    let line = |cells: &[String]| cells.iter().map(|c| escape(c)).collect::<Vec<_>>().join(sep);

    let mut out = line(header);
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.as_slice()));
        out.push('\n');
    }
    out
}
