//! `bompricer catalog` command - Inspect and maintain the component catalog
//!
//! The catalog is a local SQLite database holding:
//! - canonical component records keyed by part number
//! - one row of supplier order codes per part number
//!
//! It is rebuilt wholesale by `bompricer update`.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::OutputFormat;
use crate::cli::helpers::{load_config, open_catalog, to_json};
use crate::cli::table;
use crate::cli::GlobalOpts;
use crate::core::catalog::{ComponentQuery, ComponentRecord, OrderCodes};
use crate::core::normalize::tidy_value;

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// Create an empty catalog (no-op if it already exists)
    Init,

    /// Delete the catalog database
    Clear,

    /// Show catalog statistics
    Status,

    /// Show one component by part number
    Show {
        /// Part number
        partnumber: String,
    },

    /// Find components by attributes (unset catalog attributes match anything)
    Find {
        /// Component value, e.g. 4k7 or 100nf
        #[arg(long)]
        value: String,

        /// Part type, e.g. resistor
        #[arg(long = "type")]
        parttype: Option<String>,

        #[arg(long)]
        tolerance: Option<String>,

        #[arg(long)]
        power_rating: Option<String>,

        #[arg(long)]
        voltage: Option<String>,

        #[arg(long)]
        spec: Option<String>,
    },

    /// Execute SQL query against the catalog (read-only)
    Query {
        /// SQL query to execute
        sql: String,
    },
}

pub fn run(cmd: CatalogCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CatalogCommands::Init => run_init(global),
        CatalogCommands::Clear => run_clear(global),
        CatalogCommands::Status => run_status(global),
        CatalogCommands::Show { partnumber } => run_show(&partnumber, global),
        CatalogCommands::Find {
            value,
            parttype,
            tolerance,
            power_rating,
            voltage,
            spec,
        } => {
            let query = ComponentQuery::new(tidy_value(Some(value.as_str())).unwrap_or_default())
                .parttype(tidy_value(parttype.as_deref()))
                .tolerance(tidy_value(tolerance.as_deref()))
                .power_rating(tidy_value(power_rating.as_deref()))
                .voltage(tidy_value(voltage.as_deref()))
                .spec(tidy_value(spec.as_deref()));
            run_find(&query, global)
        }
        CatalogCommands::Query { sql } => run_query(&sql, global),
    }
}

fn run_init(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let existed = config.catalog.exists();
    open_catalog(&config)?;

    if !global.quiet {
        if existed {
            println!("Catalog already exists at {}", config.catalog.display());
        } else {
            println!(
                "{} Created catalog at {}",
                style("✓").green(),
                config.catalog.display()
            );
        }
    }
    Ok(())
}

fn run_clear(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let path = &config.catalog;

    if path.exists() {
        std::fs::remove_file(path)
            .map_err(|e| miette::miette!("Failed to remove catalog: {}", e))?;

        // SQLite side files, if any
        for suffix in ["-journal", "-wal", "-shm"] {
            let mut side = path.clone().into_os_string();
            side.push(suffix);
            let _ = std::fs::remove_file(side);
        }

        if !global.quiet {
            println!("{} Catalog cleared", style("✓").green());
        }
    } else if !global.quiet {
        println!("No catalog to clear");
    }

    Ok(())
}

fn run_status(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let catalog = open_catalog(&config)?;
    let stats = catalog.statistics()?;

    if global.format == OutputFormat::Json {
        let json = serde_json::json!({
            "path": config.catalog.display().to_string(),
            "components": stats.total_components,
            "order_codes": stats.total_order_codes,
            "by_parttype": stats.by_parttype,
            "size_bytes": stats.db_size_bytes,
        });
        println!("{}", to_json(&json)?);
        return Ok(());
    }

    println!("{}", style("Catalog Status").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!("  Location:        {}", config.catalog.display());
    println!("  Size:            {} KB", stats.db_size_bytes / 1024);
    println!("  Components:      {}", stats.total_components);
    println!("  Order codes:     {}", stats.total_order_codes);

    if !stats.by_parttype.is_empty() {
        println!();
        println!("  By part type:");
        let mut types: Vec<_> = stats.by_parttype.iter().collect();
        types.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (parttype, count) in types {
            println!("    {:<16} {}", parttype, count);
        }
    }

    Ok(())
}

fn run_show(partnumber: &str, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let catalog = open_catalog(&config)?;

    let partnumber = tidy_value(Some(partnumber)).unwrap_or_default();
    let records = catalog.find_by_partnumber(&partnumber)?;

    let Some(record) = records.first() else {
        let codes_only = catalog.order_codes(&partnumber)?;
        return Err(match codes_only {
            Some(_) => miette::miette!(
                "Part number '{}' has order codes but no component record",
                partnumber
            ),
            None => miette::miette!("No component with part number '{}'", partnumber),
        });
    };

    match global.format {
        OutputFormat::Json => println!("{}", to_json(record)?),
        OutputFormat::Auto => print!("{}", serde_yml::to_string(record).into_diagnostic()?),
        format => print!("{}", table::render(&columns(), &[record_row(record)], format)?),
    }
    Ok(())
}

fn run_find(query: &ComponentQuery, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let catalog = open_catalog(&config)?;
    let records = catalog.find(query)?;

    let rows: Vec<Vec<String>> = records.iter().map(record_row).collect();
    print!("{}", table::render(&columns(), &rows, global.format)?);

    if !global.quiet && global.format == OutputFormat::Auto {
        println!("{} component(s) found", records.len());
    }
    Ok(())
}

fn run_query(sql: &str, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let catalog = open_catalog(&config)?;

    let columns = catalog.query_columns(sql)?;
    let rows = catalog.query_raw(sql)?;

    // Raw queries default to TSV for piping
    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        other => other,
    };
    print!("{}", table::render(&columns, &rows, format)?);
    Ok(())
}

fn columns() -> Vec<&'static str> {
    ComponentRecord::ATTRIBUTES
        .iter()
        .chain(OrderCodes::SUPPLIERS.iter())
        .copied()
        .collect()
}

fn record_row(record: &ComponentRecord) -> Vec<String> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        record.partnumber.clone(),
        record.parttype.clone(),
        opt(&record.footprint),
        opt(&record.value),
        opt(&record.tolerance),
        opt(&record.power_rating),
        opt(&record.voltage),
        opt(&record.spec),
        opt(&record.order_codes.mouser),
        opt(&record.order_codes.farnell),
        opt(&record.order_codes.other),
    ]
}
