//! Core module - catalog, classification, consolidation and ordering

pub mod catalog;
pub mod classify;
pub mod config;
pub mod consolidate;
pub mod normalize;
pub mod order;

pub use catalog::{
    CatalogStats, ComponentCatalog, ComponentQuery, ComponentRecord, ComponentSource,
    ImportStats, MemoryCatalog, OrderCodes,
};
pub use classify::{Classification, PartClassifier, RuleSpec};
pub use config::{Config, ConfigError};
pub use consolidate::{AggregatedEntry, BomConsolidator, MatchIssue, Resolution};
pub use normalize::{AggregationKey, NormalizedDescriptor, RawEntry};
pub use order::BomOrderer;
