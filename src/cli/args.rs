//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    catalog::CatalogCommands, completions::CompletionsArgs, gen::GenArgs, update::UpdateArgs,
};

#[derive(Parser)]
#[command(name = "bompricer")]
#[command(author, version, about = "Consolidate KiCad BOMs into one priced, ordering-ready list")]
#[command(long_about = "Merges part lists from several boards into a single deduplicated BOM, \
matching each line against a local component catalog to fill in part numbers and supplier order codes.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file (layered over the global and ./bompricer.yaml configs)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Component catalog database (default: dbs/components.db)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Consolidate BOM files into a single ordered BOM
    Gen(GenArgs),

    /// Rebuild the component catalog from its data source
    Update(UpdateArgs),

    /// Inspect and maintain the component catalog
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for terminals
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}
