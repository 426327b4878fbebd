//! In-memory catalog
//!
//! Same lookup semantics as the SQLite catalog, evaluated with
//! [`ComponentQuery::matches`] instead of SQL.

use std::collections::BTreeMap;

use miette::Result;

use super::{ComponentQuery, ComponentRecord, ComponentSource};

/// A catalog held in a map keyed by part number
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    records: BTreeMap<String, ComponentRecord>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = ComponentRecord>) -> Self {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(record);
        }
        catalog
    }

    /// Insert or replace by part number
    pub fn insert(&mut self, record: ComponentRecord) {
        self.records.insert(record.partnumber.clone(), record);
    }
}

impl ComponentSource for MemoryCatalog {
    fn find_by_partnumber(&self, partnumber: &str) -> Result<Vec<ComponentRecord>> {
        Ok(self.records.get(partnumber).cloned().into_iter().collect())
    }

    fn find(&self, query: &ComponentQuery) -> Result<Vec<ComponentRecord>> {
        Ok(self
            .records
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }
}
