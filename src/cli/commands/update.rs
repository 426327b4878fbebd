//! `bompricer update` command - Rebuild the component catalog
//!
//! The source is fetched completely before the catalog is touched, and the
//! rebuild runs in one transaction, so a failed download or an unreadable
//! source leaves the existing catalog in place.

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};

use crate::cli::helpers::{is_remote, load_config, open_catalog};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Catalog source: an http(s) URL or a local CSV file (default: config data_url)
    #[arg(long, short = 's')]
    pub source: Option<String>,
}

pub fn run(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;

    let Some(source) = args.source.or_else(|| config.data_url.clone()) else {
        return Err(miette::miette!(
            help = "set `data_url` in bompricer.yaml or pass --source",
            "No catalog source configured"
        ));
    };

    if !global.quiet {
        eprintln!("{} Fetching component data from {}", style("→").blue(), source);
    }
    let data = fetch_source(&source)?;

    let catalog = open_catalog(&config)?;
    let stats = catalog.rebuild_from_csv(data.as_slice())?;

    if !global.quiet {
        eprintln!(
            "{} Catalog rebuilt at {}",
            style("✓").green(),
            config.catalog.display()
        );
        eprintln!("  Rows processed:  {}", stats.rows_processed);
        eprintln!("  Imported:        {}", stats.imported);
        eprintln!("  Skipped:         {}", stats.skipped);
        if stats.errors > 0 {
            eprintln!("  {} Errors:        {}", style("✗").red(), stats.errors);
        }
    }

    Ok(())
}

/// Read the catalog source into memory
pub fn fetch_source(source: &str) -> Result<Vec<u8>> {
    if is_remote(source) {
        tracing::debug!(url = source, "downloading component data");
        let response = reqwest::blocking::get(source)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to download {}", source))?
            .error_for_status()
            .into_diagnostic()?;
        let bytes = response.bytes().into_diagnostic()?;
        Ok(bytes.to_vec())
    } else {
        std::fs::read(source)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", source))
    }
}
