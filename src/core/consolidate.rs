//! BOM consolidation
//!
//! Classifies each raw line item, resolves it against the component catalog
//! and merges it into an accumulated list keyed by
//! parttype + value + tolerance + spec. Catalog ambiguity is never fatal:
//! unmatched and ambiguous items still aggregate, with a placeholder part
//! number and a recorded [`MatchIssue`].

use std::collections::HashMap;
use std::fmt;

use miette::Result;
use serde::Serialize;

use crate::core::catalog::{ComponentRecord, ComponentSource};
use crate::core::classify::PartClassifier;
use crate::core::normalize::{AggregationKey, NormalizedDescriptor, RawEntry};

/// Part number used when the catalog has no match
pub const NO_PART_NUMBER: &str = "no part number";

/// Part number used when the catalog has several matches
pub const AMBIGUOUS_PART_NUMBER: &str = "no components number";

/// One consolidated line of the output BOM
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedEntry {
    pub parttype: String,
    pub value: String,
    pub spec: Option<String>,
    #[serde(rename = "part number")]
    pub part_number: String,
    pub quantity: u64,
    pub mouser: Option<String>,
    pub farnell: Option<String>,
    pub other: Option<String>,
}

impl AggregatedEntry {
    /// True if any supplier order code is present
    pub fn has_order_codes(&self) -> bool {
        self.mouser.is_some() || self.farnell.is_some() || self.other.is_some()
    }
}

/// Outcome of a catalog lookup for one descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Unmatched,
    Matched(ComponentRecord),
    Ambiguous(Vec<ComponentRecord>),
}

impl Resolution {
    pub fn from_candidates(mut candidates: Vec<ComponentRecord>) -> Self {
        match candidates.len() {
            0 => Resolution::Unmatched,
            1 => Resolution::Matched(candidates.remove(0)),
            _ => Resolution::Ambiguous(candidates),
        }
    }

    /// The single matched component, if any
    pub fn component(&self) -> Option<&ComponentRecord> {
        match self {
            Resolution::Matched(record) => Some(record),
            _ => None,
        }
    }

    pub fn part_number(&self) -> &str {
        match self {
            Resolution::Unmatched => NO_PART_NUMBER,
            Resolution::Matched(record) => &record.partnumber,
            Resolution::Ambiguous(_) => AMBIGUOUS_PART_NUMBER,
        }
    }
}

/// A non-fatal problem met while consolidating
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchIssue {
    /// The part identifier matched no alias or rule
    UnknownPart { part: String },
    /// No catalog component matched
    NoMatch { key: String },
    /// Several catalog components matched
    Ambiguous { key: String, candidates: Vec<String> },
}

impl fmt::Display for MatchIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchIssue::UnknownPart { part } => write!(f, "unrecognized part '{}'", part),
            MatchIssue::NoMatch { key } => write!(f, "no components found for '{}'", key),
            MatchIssue::Ambiguous { key, candidates } => write!(
                f,
                "multiple components found for '{}': {}",
                key,
                candidates.join(", ")
            ),
        }
    }
}

/// Accumulates raw line items into a deduplicated BOM
pub struct BomConsolidator<'a, C: ComponentSource + ?Sized> {
    catalog: &'a C,
    classifier: PartClassifier,
    entries: Vec<AggregatedEntry>,
    index: HashMap<AggregationKey, usize>,
    issues: Vec<MatchIssue>,
}

impl<'a, C: ComponentSource + ?Sized> BomConsolidator<'a, C> {
    pub fn new(catalog: &'a C, classifier: PartClassifier) -> Self {
        Self {
            catalog,
            classifier,
            entries: Vec::new(),
            index: HashMap::new(),
            issues: Vec::new(),
        }
    }

    /// Merge one raw line item
    ///
    /// The first item seen for a key decides the catalog-derived fields of
    /// that line; later items with the same key only add their quantity.
    /// Only catalog failures are returned as errors.
    pub fn add_entry(&mut self, raw: &RawEntry) -> Result<()> {
        let descriptor = self.normalize(raw);
        let key = descriptor.aggregation_key();

        if let Some(&idx) = self.index.get(&key) {
            self.entries[idx].quantity += u64::from(descriptor.quantity);
            tracing::debug!(key = %key, quantity = descriptor.quantity, "merged into existing line");
            return Ok(());
        }

        let resolution = self.resolve(&descriptor, &key)?;
        let component = resolution.component();

        let entry = AggregatedEntry {
            parttype: component
                .map(|c| c.parttype.clone())
                .unwrap_or_else(|| descriptor.parttype.clone()),
            value: component
                .and_then(|c| c.value.clone())
                .unwrap_or_else(|| descriptor.value.clone()),
            spec: component
                .and_then(|c| c.spec.clone())
                .or_else(|| descriptor.spec.clone()),
            part_number: resolution.part_number().to_string(),
            quantity: u64::from(descriptor.quantity),
            mouser: component.and_then(|c| c.order_codes.mouser.clone()),
            farnell: component.and_then(|c| c.order_codes.farnell.clone()),
            other: component.and_then(|c| c.order_codes.other.clone()),
        };

        self.index.insert(key, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Merge a sequence of raw line items
    pub fn add_entries<'r>(&mut self, raws: impl IntoIterator<Item = &'r RawEntry>) -> Result<()> {
        for raw in raws {
            self.add_entry(raw)?;
        }
        Ok(())
    }

    /// The accumulated lines, in first-seen order
    pub fn get_output(&self) -> Vec<AggregatedEntry> {
        self.entries.clone()
    }

    /// Consume the consolidator, returning its lines and issues
    pub fn finish(self) -> (Vec<AggregatedEntry>, Vec<MatchIssue>) {
        (self.entries, self.issues)
    }

    /// Problems recorded so far
    pub fn issues(&self) -> &[MatchIssue] {
        &self.issues
    }

    fn normalize(&mut self, raw: &RawEntry) -> NormalizedDescriptor {
        let part = raw.part();
        let classification = self.classifier.classify(&part);
        if !classification.is_known() {
            tracing::warn!(part = %part, "unrecognized part identifier, using it as its own type");
            self.issues.push(MatchIssue::UnknownPart { part });
        }
        NormalizedDescriptor::new(raw, classification.into_parttype())
    }

    fn resolve(
        &mut self,
        descriptor: &NormalizedDescriptor,
        key: &AggregationKey,
    ) -> Result<Resolution> {
        let candidates = match descriptor.partnumber.as_deref() {
            Some(partnumber) => self.catalog.find_by_partnumber(partnumber)?,
            None => self.catalog.find(&descriptor.query())?,
        };
        let resolution = Resolution::from_candidates(candidates);

        match &resolution {
            Resolution::Unmatched => {
                tracing::warn!(
                    key = %key,
                    parttype = %descriptor.parttype,
                    value = %descriptor.value,
                    partnumber = ?descriptor.partnumber,
                    "no components found"
                );
                self.issues.push(MatchIssue::NoMatch {
                    key: key.to_string(),
                });
            }
            Resolution::Ambiguous(candidates) => {
                let numbers: Vec<String> =
                    candidates.iter().map(|c| c.partnumber.clone()).collect();
                tracing::warn!(key = %key, candidates = ?numbers, "multiple components found");
                self.issues.push(MatchIssue::Ambiguous {
                    key: key.to_string(),
                    candidates: numbers,
                });
            }
            Resolution::Matched(record) => {
                tracing::debug!(key = %key, partnumber = %record.partnumber, "matched component");
            }
        }

        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{ComponentQuery, MemoryCatalog, OrderCodes};

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::from_records([
            ComponentRecord::new("crcw060310k0", "resistor")
                .with_value("10k")
                .with_order_codes(OrderCodes {
                    mouser: Some("71-CRCW0603-10K".to_string()),
                    farnell: Some("1469749".to_string()),
                    other: None,
                }),
            ComponentRecord::new("grm188-x7r", "capacitor")
                .with_value("100nf")
                .with_spec("x7r"),
            ComponentRecord::new("grm188-c0g", "capacitor")
                .with_value("100nf")
                .with_spec("x7r"),
            ComponentRecord::new("bat54", "diode")
                .with_value("bat54")
                .with_spec("schottky"),
        ])
    }

    fn resistor(value: &str, quantity: &str) -> RawEntry {
        RawEntry::new()
            .with("Part", "R")
            .with("Value", value)
            .with("Quantity", quantity)
    }

    #[test]
    fn test_single_match_takes_catalog_data() {
        let catalog = catalog();
        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());

        bom.add_entry(&resistor("10K", "2")).unwrap();

        let output = bom.get_output();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].parttype, "resistor");
        assert_eq!(output[0].value, "10k");
        assert_eq!(output[0].part_number, "crcw060310k0");
        assert_eq!(output[0].quantity, 2);
        assert_eq!(output[0].mouser.as_deref(), Some("71-CRCW0603-10K"));
        assert_eq!(output[0].farnell.as_deref(), Some("1469749"));
        assert_eq!(output[0].other, None);
        assert!(bom.issues().is_empty());
    }

    #[test]
    fn test_repeated_entry_accumulates() {
        let catalog = catalog();
        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());

        let raw = resistor("10k", "3");
        for _ in 0..5 {
            bom.add_entry(&raw).unwrap();
        }

        let output = bom.get_output();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].quantity, 15);
    }

    #[test]
    fn test_no_match_uses_placeholder_and_raw_values() {
        let catalog = catalog();
        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());

        bom.add_entry(
            &resistor("220r", "4")
                .with("Spec", "Metal Film")
                .with("Tolerance", "1%"),
        )
        .unwrap();

        let output = bom.get_output();
        assert_eq!(output[0].parttype, "resistor");
        assert_eq!(output[0].value, "220r");
        assert_eq!(output[0].spec.as_deref(), Some("metal film"));
        assert_eq!(output[0].part_number, NO_PART_NUMBER);
        assert!(!output[0].has_order_codes());
        assert_eq!(
            bom.issues(),
            &[MatchIssue::NoMatch {
                key: "resistor/220r/1%/metal film".to_string()
            }]
        );
    }

    #[test]
    fn test_ambiguous_match_uses_placeholder() {
        let catalog = catalog();
        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());

        bom.add_entry(
            &RawEntry::new()
                .with("Part", "C")
                .with("Value", "100nF")
                .with("Spec", "X7R")
                .with("Quantity", "10"),
        )
        .unwrap();

        let output = bom.get_output();
        assert_eq!(output[0].part_number, AMBIGUOUS_PART_NUMBER);
        assert_eq!(output[0].value, "100nf");
        assert!(!output[0].has_order_codes());
        assert_eq!(
            bom.issues(),
            &[MatchIssue::Ambiguous {
                key: "capacitor/100nf/-/x7r".to_string(),
                candidates: vec!["grm188-c0g".to_string(), "grm188-x7r".to_string()],
            }]
        );
    }

    #[test]
    fn test_partnumber_lookup_bypasses_attribute_match() {
        let catalog = catalog();
        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());

        bom.add_entry(
            &RawEntry::new()
                .with("Part", "D_Schottky")
                .with("Value", "BAT54")
                .with("PartNumber", "BAT54")
                .with("Quantity", "1"),
        )
        .unwrap();

        let output = bom.get_output();
        assert_eq!(output[0].part_number, "bat54");
        assert_eq!(output[0].spec.as_deref(), Some("schottky"));

        bom.add_entry(
            &RawEntry::new()
                .with("Part", "D")
                .with("Value", "1n4148")
                .with("PartNumber", "missing-pn")
                .with("Quantity", "1"),
        )
        .unwrap();
        assert_eq!(bom.get_output()[1].part_number, NO_PART_NUMBER);
    }

    #[test]
    fn test_first_entry_decides_catalog_fields() {
        let catalog = catalog();
        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());

        // Same key; the first is unmatched, the second names a real part
        bom.add_entry(&resistor("10k", "1").with("PartNumber", "nope"))
            .unwrap();
        bom.add_entry(&resistor("10k", "2").with("PartNumber", "crcw060310k0"))
            .unwrap();

        let output = bom.get_output();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].part_number, NO_PART_NUMBER);
        assert_eq!(output[0].quantity, 3);
        assert!(!output[0].has_order_codes());
    }

    #[test]
    fn test_unknown_part_aggregates_by_itself() {
        let catalog = catalog();
        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());

        let opamp = RawEntry::new()
            .with("Part", "TL072")
            .with("Value", "TL072")
            .with("Quantity", "2");
        bom.add_entry(&opamp).unwrap();
        bom.add_entry(&opamp).unwrap();

        let output = bom.get_output();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].parttype, "tl072");
        assert_eq!(output[0].quantity, 4);
        assert!(bom
            .issues()
            .contains(&MatchIssue::UnknownPart {
                part: "tl072".to_string()
            }));
    }

    #[test]
    fn test_quantity_accumulation_is_order_independent() {
        let catalog = catalog();
        let entries = vec![
            resistor("10k", "1"),
            resistor("4k7", "2"),
            resistor("10k", "3"),
            resistor("4k7", ""),
            resistor("10k", "5"),
        ];

        let totals = |order: &[usize]| {
            let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());
            for &i in order {
                bom.add_entry(&entries[i]).unwrap();
            }
            let mut lines: Vec<(String, u64)> = bom
                .get_output()
                .into_iter()
                .map(|e| (e.value, e.quantity))
                .collect();
            lines.sort();
            lines
        };

        let expected = vec![("10k".to_string(), 9), ("4k7".to_string(), 2)];
        assert_eq!(totals(&[0, 1, 2, 3, 4]), expected);
        assert_eq!(totals(&[4, 3, 2, 1, 0]), expected);
        assert_eq!(totals(&[2, 0, 3, 4, 1]), expected);
    }

    #[test]
    fn test_key_ignores_voltage_and_footprint() {
        let catalog = catalog();
        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());

        bom.add_entry(&resistor("1m", "1").with("Voltage", "50v")).unwrap();
        bom.add_entry(&resistor("1m", "1").with("FootprintType", "smd"))
            .unwrap();

        assert_eq!(bom.get_output().len(), 1);
        assert_eq!(bom.get_output()[0].quantity, 2);
    }

    #[test]
    fn test_tolerance_and_spec_with_same_text_stay_separate() {
        let catalog = catalog();
        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());

        bom.add_entry(&resistor("10k", "2").with("Tolerance", "1%"))
            .unwrap();
        bom.add_entry(&resistor("10k", "3").with("Spec", "1%")).unwrap();

        let output = bom.get_output();
        assert_eq!(output.len(), 2);
        assert_eq!(output[0].quantity, 2);
        assert_eq!(output[1].quantity, 3);
        assert_eq!(output[1].spec.as_deref(), Some("1%"));
    }

    #[test]
    fn test_resolution_from_candidates() {
        assert_eq!(Resolution::from_candidates(vec![]), Resolution::Unmatched);
        let one = ComponentRecord::new("a", "resistor");
        assert_eq!(
            Resolution::from_candidates(vec![one.clone()]).part_number(),
            "a"
        );
        let two = Resolution::from_candidates(vec![one.clone(), one]);
        assert_eq!(two.part_number(), AMBIGUOUS_PART_NUMBER);
        assert!(two.component().is_none());
    }

    #[test]
    fn test_wildcard_catalog_record_matches_specific_query() {
        let catalog = MemoryCatalog::from_records([ComponentRecord::new("generic-1k", "resistor")
            .with_value("1k")]);
        assert_eq!(
            catalog
                .find(&ComponentQuery::new("1k").tolerance(Some("0.1%")))
                .unwrap()
                .len(),
            1
        );

        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());
        bom.add_entry(&resistor("1k", "1").with("Tolerance", "0.1%"))
            .unwrap();
        assert_eq!(bom.get_output()[0].part_number, "generic-1k");
    }

    #[test]
    fn test_serialized_entries_keep_supplier_fields_apart() {
        let catalog = catalog();
        let mut bom = BomConsolidator::new(&catalog, PartClassifier::new().unwrap());
        bom.add_entry(&resistor("10k", "1")).unwrap();
        bom.add_entry(&resistor("22k", "1")).unwrap();

        let output = bom.get_output();
        let priced = serde_json::to_value(&output[0]).unwrap();
        let bare = serde_json::to_value(&output[1]).unwrap();

        assert_eq!(priced["part number"], "crcw060310k0");
        assert_eq!(priced["mouser"], "71-CRCW0603-10K");
        assert_eq!(bare["part number"], NO_PART_NUMBER);
        assert!(bare["mouser"].is_null());
        assert_ne!(priced, bare);
    }
}
