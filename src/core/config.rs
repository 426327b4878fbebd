//! Configuration management with layered hierarchy

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::core::catalog::DEFAULT_CATALOG_PATH;
use crate::core::classify::RuleSpec;

/// File name of the working-directory config
pub const LOCAL_CONFIG_FILE: &str = "bompricer.yaml";

/// Default output BOM path
pub const DEFAULT_OUTPUT_PATH: &str = "bom.csv";

/// XML netlist fields lifted into raw records by default
pub const DEFAULT_CUSTOM_FIELDS: &[&str] = &[
    "Tolerance",
    "Voltage",
    "Spec",
    "FootprintType",
    "PartNumber",
    "Quantity",
];

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    #[diagnostic(code(bompricer::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    #[diagnostic(
        code(bompricer::config::parse),
        help("config files are YAML, e.g. `catalog: dbs/components.db`")
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

/// One configuration layer as read from YAML; unset keys leave lower layers alone
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    catalog: Option<PathBuf>,
    data_url: Option<String>,
    output: Option<PathBuf>,
    custom_fields: Option<Vec<String>>,
    parttypes: HashMap<String, String>,
    parttype_rules: Vec<RuleSpec>,
}

/// Effective bompricer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite catalog location
    pub catalog: PathBuf,

    /// Where `update` imports catalog rows from (URL or file)
    pub data_url: Option<String>,

    /// Default output BOM path
    pub output: PathBuf,

    /// XML netlist fields lifted into raw records
    pub custom_fields: Vec<String>,

    /// Extra exact identifier to part-type aliases
    pub parttypes: HashMap<String, String>,

    /// Extra ordered part-type rules, tried before the built-ins
    pub parttype_rules: Vec<RuleSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from(DEFAULT_CATALOG_PATH),
            data_url: None,
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            custom_fields: DEFAULT_CUSTOM_FIELDS.iter().map(|f| f.to_string()).collect(),
            parttypes: HashMap::new(),
            parttype_rules: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// Discovered config files that cannot be read are skipped with a
    /// warning; an explicitly requested file must load.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Global user config (~/.config/bompricer/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            config.merge_discovered(&global_path);
        }

        // Working-directory config
        config.merge_discovered(Path::new(LOCAL_CONFIG_FILE));

        if let Some(path) = explicit {
            config.merge(Self::read_layer(path)?);
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "bompricer")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Parse one YAML layer on top of the defaults
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        let mut config = Config::default();
        config.merge(serde_yml::from_str(contents)?);
        Ok(config)
    }

    fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn merge_discovered(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        match Self::read_layer(path) {
            Ok(layer) => {
                tracing::debug!(path = %path.display(), "loaded config");
                self.merge(layer);
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring config file"),
        }
    }

    /// Merge a layer into this config (the layer takes precedence)
    fn merge(&mut self, other: ConfigLayer) {
        if let Some(catalog) = other.catalog {
            self.catalog = catalog;
        }
        if other.data_url.is_some() {
            self.data_url = other.data_url;
        }
        if let Some(output) = other.output {
            self.output = output;
        }
        if let Some(custom_fields) = other.custom_fields {
            self.custom_fields = custom_fields;
        }
        self.parttypes.extend(other.parttypes);
        if !other.parttype_rules.is_empty() {
            let mut rules = other.parttype_rules;
            rules.extend(std::mem::take(&mut self.parttype_rules));
            self.parttype_rules = rules;
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(catalog) = var("BOMPRICER_CATALOG").filter(|v| !v.is_empty()) {
            self.catalog = PathBuf::from(catalog);
        }
        if let Some(data_url) = var("BOMPRICER_DATA_URL").filter(|v| !v.is_empty()) {
            self.data_url = Some(data_url);
        }
    }
}
