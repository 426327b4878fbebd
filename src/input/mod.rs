//! Part-list ingestion
//!
//! Turns part-list files into [`RawEntry`] records. Tabular files become one
//! record per row; KiCad XML netlists become one record per placed component.
//! A file that cannot be read is reported and contributes no records, so one
//! bad input never stops a consolidation run.

mod netlist;
mod tabular;

pub use netlist::read_netlist;
pub use tabular::read_table;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::core::normalize::RawEntry;

#[derive(Debug, Error, Diagnostic)]
pub enum BomReadError {
    #[error("could not find BOM file {path}")]
    #[diagnostic(code(bompricer::input::not_found))]
    NotFound { path: PathBuf },

    #[error("unsupported BOM file {path}")]
    #[diagnostic(
        code(bompricer::input::unsupported),
        help("part lists must be .csv tables or KiCad .xml netlists")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("malformed CSV in {path}")]
    #[diagnostic(code(bompricer::input::csv))]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed XML in {path}")]
    #[diagnostic(code(bompricer::input::xml))]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("failed to read {path}")]
    #[diagnostic(code(bompricer::input::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Supported part-list formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BomFormat {
    Csv,
    Netlist,
}

impl BomFormat {
    /// Detect the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(BomFormat::Csv),
            "xml" => Some(BomFormat::Netlist),
            _ => None,
        }
    }
}

/// Read one part-list file
pub fn try_read_bom(path: &Path, custom_fields: &[String]) -> Result<Vec<RawEntry>, BomReadError> {
    let format = BomFormat::from_path(path).ok_or_else(|| BomReadError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    if !path.is_file() {
        return Err(BomReadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|source| BomReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    match format {
        BomFormat::Csv => read_table(reader).map_err(|source| BomReadError::Csv {
            path: path.to_path_buf(),
            source,
        }),
        BomFormat::Netlist => {
            read_netlist(reader, custom_fields).map_err(|source| BomReadError::Xml {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Read one part-list file; failures are logged and yield no records
pub fn read_bom(path: &Path, custom_fields: &[String]) -> Vec<RawEntry> {
    match try_read_bom(path, custom_fields) {
        Ok(entries) => {
            tracing::debug!(path = %path.display(), entries = entries.len(), "read BOM");
            entries
        }
        Err(e) => {
            let cause = std::error::Error::source(&e)
                .map(ToString::to_string)
                .unwrap_or_default();
            tracing::warn!(error = %e, cause = %cause, "skipping BOM");
            Vec::new()
        }
    }
}

/// Expand the given paths into part-list files
///
/// Directories are walked for `.csv` and `.xml` files (sorted by name);
/// anything else is passed through so that a missing file is still reported.
pub fn collect_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = walkdir::WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| BomFormat::from_path(p).is_some())
                .collect();
            if found.is_empty() {
                tracing::warn!(dir = %path.display(), "no BOM files found in directory");
            }
            files.append(&mut found);
        } else {
            files.push(path.clone());
        }
    }
    files
}
