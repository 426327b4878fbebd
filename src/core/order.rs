//! Deterministic BOM ordering
//!
//! Lines are ordered by part type, then by the magnitude encoded in their
//! value (engineering notation such as `4k7` or `100nf`), then by quantity
//! with the largest first. The sort is stable, so lines that tie on all
//! three keys keep their consolidation order.
//!
//! The magnitude only recognizes the `p`, `n`, `u`, `k` and `m` prefixes.
//! Any other prefix, including the resistor base-unit `r` (`100r`), has a
//! multiplier of zero and therefore sorts with unparseable values.

use std::cmp::Ordering;

use regex::Regex;

use crate::core::consolidate::AggregatedEntry;

/// Orders consolidated lines
#[derive(Debug, Clone)]
pub struct BomOrderer {
    capacitor: Regex,
    resistor: Regex,
}

impl BomOrderer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            capacitor: Regex::new(r"^(\d+)([pnu])(\d*)f$")?,
            resistor: Regex::new(r"^(\d+)([kmr])(\d*)$")?,
        })
    }

    /// Sort lines by parttype, then sortable value, then quantity (descending)
    pub fn order(&self, mut entries: Vec<AggregatedEntry>) -> Vec<AggregatedEntry> {
        // One stable sort on the composite key gives the same order as three
        // stable passes: quantity descending, then sortable value, then parttype.
        entries.sort_by(|a, b| self.compare(a, b));
        entries
    }

    /// The composite comparison used by [`order`](Self::order)
    pub fn compare(&self, a: &AggregatedEntry, b: &AggregatedEntry) -> Ordering {
        a.parttype
            .cmp(&b.parttype)
            .then_with(|| {
                self.sortable_value(&a.parttype, &a.value)
                    .total_cmp(&self.sortable_value(&b.parttype, &b.value))
            })
            .then_with(|| b.quantity.cmp(&a.quantity))
    }

    /// Numeric magnitude of a value string, `0` when it cannot be derived
    pub fn sortable_value(&self, parttype: &str, value: &str) -> f64 {
        let pattern = match parttype {
            "capacitor" => &self.capacitor,
            "resistor" | "potentiometer" | "trimmer" => &self.resistor,
            _ => return 0.0,
        };

        let Some(caps) = pattern.captures(value) else {
            return 0.0;
        };

        let number = format!("{}.{}", &caps[1], &caps[3]);
        let Ok(number) = number.parse::<f64>() else {
            return 0.0;
        };

        let prefix = caps[2].chars().next().unwrap_or_default();
        number * prefix_multiplier(prefix)
    }
}

impl Default for BomOrderer {
    fn default() -> Self {
        Self::new().expect("built-in value patterns are valid")
    }
}

/// Engineering prefix multiplier; unknown prefixes (including `r`) give 0
pub fn prefix_multiplier(prefix: char) -> f64 {
    match prefix {
        'p' => 1.0,
        'n' | 'k' => 1_000.0,
        'u' | 'm' => 1_000_000.0,
        _ => 0.0,
    }
}
