//! Catalog type definitions
//!
//! Component records, supplier order codes and the partial-match query.

use std::collections::HashMap;

use serde::Serialize;

// =========================================================================
// Records
// =========================================================================

/// Supplier order codes for a single part number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderCodes {
    pub mouser: Option<String>,
    pub farnell: Option<String>,
    pub other: Option<String>,
}

impl OrderCodes {
    /// Supplier column names, in table order
    pub const SUPPLIERS: [&'static str; 3] = ["mouser", "farnell", "other"];

    pub fn is_empty(&self) -> bool {
        self.mouser.is_none() && self.farnell.is_none() && self.other.is_none()
    }
}

/// A canonical component joined with its order codes
///
/// Every attribute except `partnumber` and `parttype` may be unset, which a
/// partial-match query treats as "matches anything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentRecord {
    pub partnumber: String,
    pub parttype: String,
    pub footprint: Option<String>,
    pub value: Option<String>,
    pub tolerance: Option<String>,
    pub power_rating: Option<String>,
    pub voltage: Option<String>,
    pub spec: Option<String>,
    #[serde(flatten)]
    pub order_codes: OrderCodes,
}

impl ComponentRecord {
    /// Attribute column names, in table order
    pub const ATTRIBUTES: [&'static str; 8] = [
        "partnumber",
        "parttype",
        "footprint",
        "value",
        "tolerance",
        "power_rating",
        "voltage",
        "spec",
    ];

    pub fn new(partnumber: impl Into<String>, parttype: impl Into<String>) -> Self {
        Self {
            partnumber: partnumber.into(),
            parttype: parttype.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_tolerance(mut self, tolerance: impl Into<String>) -> Self {
        self.tolerance = Some(tolerance.into());
        self
    }

    pub fn with_spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = Some(spec.into());
        self
    }

    pub fn with_order_codes(mut self, order_codes: OrderCodes) -> Self {
        self.order_codes = order_codes;
        self
    }
}

// =========================================================================
// Query
// =========================================================================

/// Partial attribute match against the catalog
///
/// `value` must equal the record's value. Every other filter that is set to
/// a non-empty string matches records whose attribute equals it or is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentQuery {
    pub value: String,
    pub parttype: Option<String>,
    pub tolerance: Option<String>,
    pub power_rating: Option<String>,
    pub voltage: Option<String>,
    pub spec: Option<String>,
}

impl ComponentQuery {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn parttype(mut self, parttype: Option<impl Into<String>>) -> Self {
        self.parttype = parttype.map(Into::into);
        self
    }

    pub fn tolerance(mut self, tolerance: Option<impl Into<String>>) -> Self {
        self.tolerance = tolerance.map(Into::into);
        self
    }

    pub fn power_rating(mut self, power_rating: Option<impl Into<String>>) -> Self {
        self.power_rating = power_rating.map(Into::into);
        self
    }

    pub fn voltage(mut self, voltage: Option<impl Into<String>>) -> Self {
        self.voltage = voltage.map(Into::into);
        self
    }

    pub fn spec(mut self, spec: Option<impl Into<String>>) -> Self {
        self.spec = spec.map(Into::into);
        self
    }

    /// Optional filters that are actually applied, as (column, requested value)
    pub fn active_filters(&self) -> Vec<(&'static str, &str)> {
        [
            ("parttype", &self.parttype),
            ("tolerance", &self.tolerance),
            ("power_rating", &self.power_rating),
            ("voltage", &self.voltage),
            ("spec", &self.spec),
        ]
        .into_iter()
        .filter_map(|(column, requested)| {
            requested
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (column, v))
        })
        .collect()
    }

    /// Evaluate the query against one record without a database
    pub fn matches(&self, record: &ComponentRecord) -> bool {
        if record.value.as_deref() != Some(self.value.as_str()) {
            return false;
        }

        self.active_filters().into_iter().all(|(column, requested)| {
            let actual = match column {
                "parttype" => Some(record.parttype.as_str()),
                "tolerance" => record.tolerance.as_deref(),
                "power_rating" => record.power_rating.as_deref(),
                "voltage" => record.voltage.as_deref(),
                "spec" => record.spec.as_deref(),
                _ => None,
            };
            wildcard_eq(actual, requested)
        })
    }
}

/// An unset attribute matches any requested value
pub fn wildcard_eq(actual: Option<&str>, requested: &str) -> bool {
    match actual {
        None => true,
        Some(actual) => actual == requested,
    }
}

// =========================================================================
// Statistics
// =========================================================================

/// Row import statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub rows_processed: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Catalog statistics
#[derive(Debug, Default)]
pub struct CatalogStats {
    pub total_components: usize,
    pub total_order_codes: usize,
    pub by_parttype: HashMap<String, usize>,
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resistor() -> ComponentRecord {
        ComponentRecord::new("crcw06031k00", "resistor").with_value("1k")
    }

    #[test]
    fn test_unset_tolerance_matches_any_request() {
        let query = ComponentQuery::new("1k")
            .parttype(Some("resistor"))
            .tolerance(Some("1%"));
        assert!(query.matches(&resistor()));
    }

    #[test]
    fn test_set_tolerance_must_equal_request() {
        let record = resistor().with_tolerance("5%");
        let query = ComponentQuery::new("1k")
            .parttype(Some("resistor"))
            .tolerance(Some("1%"));
        assert!(!query.matches(&record));

        let query = query.tolerance(Some("5%"));
        assert!(query.matches(&record));
    }

    #[test]
    fn test_value_is_never_a_wildcard() {
        let record = ComponentRecord::new("anything", "resistor");
        assert!(!ComponentQuery::new("1k").matches(&record));
        assert!(!ComponentQuery::new("").matches(&record));
    }

    #[test]
    fn test_empty_filters_are_ignored() {
        let record = resistor().with_spec("thin film");
        let query = ComponentQuery::new("1k").spec(Some("")).parttype(None::<String>);
        assert!(query.active_filters().is_empty());
        assert!(query.matches(&record));
    }

    #[test]
    fn test_parttype_filter() {
        let query = ComponentQuery::new("1k").parttype(Some("capacitor"));
        assert!(!query.matches(&resistor()));
    }
}
