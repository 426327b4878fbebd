//! Shared helper functions for CLI commands

use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::{ComponentCatalog, Config, PartClassifier};

/// Load the layered configuration, applying command-line overrides
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    let mut config = Config::load(global.config.as_deref())?;
    if let Some(ref catalog) = global.catalog {
        config.catalog = catalog.clone();
    }
    Ok(config)
}

/// Open the configured catalog, creating it if needed
pub fn open_catalog(config: &Config) -> Result<ComponentCatalog> {
    ComponentCatalog::open(&config.catalog)
}

/// Classifier with the configured aliases and rules
pub fn build_classifier(config: &Config) -> Result<PartClassifier> {
    PartClassifier::with_extensions(&config.parttypes, &config.parttype_rules)
}

/// True for sources that are fetched over HTTP rather than read from disk
pub fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Serialize to pretty JSON
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).into_diagnostic()
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::cli::OutputFormat;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/components.csv"));
        assert!(is_remote("HTTP://example.com/components.csv"));
        assert!(!is_remote("data/components.csv"));
        assert!(!is_remote("/tmp/https.csv"));
    }

    #[test]
    fn test_catalog_override() {
        let global = GlobalOpts {
            format: OutputFormat::Auto,
            quiet: false,
            verbose: false,
            config: None,
            catalog: Some(PathBuf::from("/tmp/other.db")),
        };
        let config = load_config(&global).unwrap();
        assert_eq!(config.catalog, PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("x7r, 50v"), "\"x7r, 50v\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }
}
