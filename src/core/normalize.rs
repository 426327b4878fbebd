//! Raw part-list records and their normalized form

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::core::catalog::ComponentQuery;

/// Field aliases recognized in raw records (first non-blank alias wins)
pub mod fields {
    pub const PART: &[&str] = &["Part"];
    pub const VALUE: &[&str] = &["Value"];
    pub const TOLERANCE: &[&str] = &["Tolerance"];
    pub const VOLTAGE: &[&str] = &["Voltage"];
    pub const SPEC: &[&str] = &["Spec"];
    pub const FOOTPRINT_TYPE: &[&str] = &["FootprintType"];
    pub const PART_NUMBER: &[&str] = &["PartNumber"];
    pub const QUANTITY: &[&str] = &["Quantity", "Quantity Per PCB"];
}

/// Footprint type assumed when a record does not name one
pub const DEFAULT_FOOTPRINT_TYPE: &str = "tht";

/// One line item as read from a part-list file: field name to raw string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    fields: HashMap<String, String>,
}

impl RawEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Tidied value of the first alias that holds a non-blank string
    pub fn value_of(&self, aliases: &[&str]) -> Option<String> {
        aliases
            .iter()
            .find_map(|alias| tidy_value(self.get(alias)))
    }

    /// The tidied part identifier (empty if absent)
    pub fn part(&self) -> String {
        self.value_of(fields::PART).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawEntry {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for RawEntry {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

/// Trim and lowercase; blank becomes unset
pub fn tidy_value(raw: Option<&str>) -> Option<String> {
    raw.map(|v| v.trim().to_lowercase()).filter(|v| !v.is_empty())
}

/// Parse a quantity; absent or blank is zero
///
/// Anything that is not a non-negative integer is also treated as zero,
/// with a warning.
pub fn tidy_quantity(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return 0;
    };

    match raw.parse::<u32>() {
        Ok(quantity) => quantity,
        Err(e) => {
            tracing::warn!(quantity = raw, error = %e, "unparseable quantity, counting as 0");
            0
        }
    }
}

/// Identity of a consolidated line: parttype + value + tolerance + spec
///
/// Unset tolerance and spec stay distinct from any set value, so a
/// tolerance of "1%" never collides with a spec of "1%".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AggregationKey {
    pub parttype: String,
    pub value: String,
    pub tolerance: Option<String>,
    pub spec: Option<String>,
}

impl fmt::Display for AggregationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.parttype,
            self.value,
            self.tolerance.as_deref().unwrap_or("-"),
            self.spec.as_deref().unwrap_or("-")
        )
    }
}

/// A classified, normalized line item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedDescriptor {
    pub parttype: String,
    pub value: String,
    pub tolerance: Option<String>,
    pub voltage: Option<String>,
    pub spec: Option<String>,
    pub footprint_type: String,
    pub partnumber: Option<String>,
    pub quantity: u32,
}

impl NormalizedDescriptor {
    /// Normalize a raw record whose part identifier classified as `parttype`
    pub fn new(raw: &RawEntry, parttype: impl Into<String>) -> Self {
        let quantity = fields::QUANTITY
            .iter()
            .filter_map(|alias| raw.get(alias))
            .find(|v| !v.trim().is_empty());

        Self {
            parttype: parttype.into(),
            value: raw.value_of(fields::VALUE).unwrap_or_default(),
            tolerance: raw.value_of(fields::TOLERANCE),
            voltage: raw.value_of(fields::VOLTAGE),
            spec: raw.value_of(fields::SPEC),
            footprint_type: raw
                .value_of(fields::FOOTPRINT_TYPE)
                .unwrap_or_else(|| DEFAULT_FOOTPRINT_TYPE.to_string()),
            partnumber: raw.value_of(fields::PART_NUMBER),
            quantity: tidy_quantity(quantity),
        }
    }

    pub fn aggregation_key(&self) -> AggregationKey {
        AggregationKey {
            parttype: self.parttype.clone(),
            value: self.value.clone(),
            tolerance: self.tolerance.clone(),
            spec: self.spec.clone(),
        }
    }

    /// Catalog query for this descriptor; voltage is not a match criterion
    pub fn query(&self) -> ComponentQuery {
        ComponentQuery::new(self.value.as_str())
            .parttype(Some(self.parttype.as_str()))
            .tolerance(self.tolerance.as_deref())
            .spec(self.spec.as_deref())
    }
}
