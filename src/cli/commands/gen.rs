//! `bompricer gen` command - Consolidate BOM files
//!
//! Reads every given part list, merges identical line items across boards,
//! resolves each line against the component catalog and writes the ordered
//! result as CSV.

use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{build_classifier, load_config, open_catalog};
use crate::cli::table;
use crate::cli::GlobalOpts;
use crate::core::consolidate::{AggregatedEntry, BomConsolidator, MatchIssue};
use crate::core::BomOrderer;
use crate::input::{collect_inputs, read_bom};
use crate::output::{self, COLUMNS};

#[derive(clap::Args, Debug)]
pub struct GenArgs {
    /// BOM files (.csv or KiCad .xml) or directories containing them
    #[arg(short = 'b', long = "boms", required = true, num_args = 1..)]
    pub boms: Vec<PathBuf>,

    /// Output file (suffix is always .csv; default from config, bom.csv)
    #[arg(short = 'o', long = "out")]
    pub output: Option<PathBuf>,
}

pub fn run(args: GenArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let catalog = open_catalog(&config)?;
    let classifier = build_classifier(&config)?;
    let orderer = BomOrderer::new().into_diagnostic()?;

    if catalog.statistics()?.total_components == 0 {
        tracing::warn!(
            catalog = %config.catalog.display(),
            "component catalog is empty, run `bompricer update` first"
        );
    }

    let mut bom = BomConsolidator::new(&catalog, classifier);
    for path in collect_inputs(&args.boms) {
        let entries = read_bom(&path, &config.custom_fields);
        if !global.quiet {
            eprintln!(
                "{} Read {} entries from {}",
                style("→").blue(),
                entries.len(),
                path.display()
            );
        }
        bom.add_entries(&entries)?;
    }

    let (entries, issues) = bom.finish();
    let ordered = orderer.order(entries);

    let requested = args.output.unwrap_or_else(|| config.output.clone());
    let written = output::write_bom(&requested, &ordered)?;

    if global.quiet {
        return Ok(());
    }

    let rows: Vec<Vec<String>> = ordered.iter().map(|e| output::row(e).to_vec()).collect();
    print!("{}", table::render(&COLUMNS, &rows, global.format)?);

    print_summary(&ordered, &issues);
    eprintln!(
        "{} Wrote {} lines to {}",
        style("✓").green(),
        ordered.len(),
        written.display()
    );

    Ok(())
}

fn print_summary(entries: &[AggregatedEntry], issues: &[MatchIssue]) {
    let quantity: u64 = entries.iter().map(|e| e.quantity).sum();
    let (unmatched, ambiguous, unknown) =
        issues
            .iter()
            .fold((0, 0, 0), |(n, a, u), issue| match issue {
                MatchIssue::NoMatch { .. } => (n + 1, a, u),
                MatchIssue::Ambiguous { .. } => (n, a + 1, u),
                MatchIssue::UnknownPart { .. } => (n, a, u + 1),
            });

    eprintln!();
    eprintln!("  Lines:           {}", entries.len());
    eprintln!("  Total parts:     {}", quantity);
    eprintln!(
        "  Matched:         {}",
        entries.len().saturating_sub(unmatched + ambiguous)
    );

    if unmatched + ambiguous + unknown == 0 {
        return;
    }
    eprintln!("  {} Unmatched:     {}", style("✗").red(), unmatched);
    eprintln!("  {} Ambiguous:     {}", style("✗").red(), ambiguous);
    eprintln!("  {} Unknown parts: {}", style("✗").yellow(), unknown);
}
