//! Part-type classification
//!
//! Maps a raw part identifier (the schematic library symbol name) to a
//! canonical part type. Exact aliases are tried first, then an ordered list
//! of patterns. Earlier rules take precedence, and several rules may share a
//! part type, so the rules are a list and never a map keyed by type.

use std::collections::HashMap;

use miette::{IntoDiagnostic, Result, WrapErr};
use regex::Regex;
use serde::Deserialize;

/// Built-in exact identifier aliases
const BUILTIN_PARTTYPES: &[(&str, &str)] = &[
    ("c", "capacitor"),
    ("c_polarized", "capacitor"),
    ("d", "diode"),
    ("d_schottky", "diode"),
    ("d_zener", "diode"),
    ("r", "resistor"),
    ("r_potentiometer", "potentiometer"),
    ("r_potentiometer_trim", "trimmer"),
];

/// Built-in pattern rules, in precedence order
const BUILTIN_RULES: &[(&str, &str)] = &[
    ("transistor", r".*transistor.*"),
    ("switch", r"sw_.*"),
    ("connector", r"conn_.*"),
    ("socket", r"bananasocket_.*"),
    ("socket", r".*mono jack.*"),
    ("connector", r"eurorack power.*"),
    ("connector", r"conn_\d+x\d+.*"),
];

/// A user-supplied pattern rule (as read from configuration)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleSpec {
    pub parttype: String,
    pub pattern: String,
}

/// A compiled pattern rule
///
/// Patterns are anchored at the start of the identifier.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub parttype: String,
    pattern: Regex,
}

impl ClassificationRule {
    pub fn new(parttype: impl Into<String>, pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{})", pattern);
        let pattern = Regex::new(&anchored)
            .into_diagnostic()
            .wrap_err_with(|| format!("Invalid part-type pattern '{}'", pattern))?;
        Ok(Self {
            parttype: parttype.into(),
            pattern,
        })
    }

    pub fn is_match(&self, part: &str) -> bool {
        self.pattern.is_match(part)
    }

    /// The pattern as written, without the added anchor
    pub fn pattern(&self) -> &str {
        let s = self.pattern.as_str();
        s.strip_prefix("^(?:")
            .and_then(|s| s.strip_suffix(')'))
            .unwrap_or(s)
    }
}

/// Outcome of classifying one part identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Matched an alias or a rule
    Known(String),
    /// Matched nothing; the identifier is used as its own type
    Unknown(String),
}

impl Classification {
    pub fn parttype(&self) -> &str {
        match self {
            Classification::Known(parttype) | Classification::Unknown(parttype) => parttype,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Classification::Known(_))
    }

    pub fn into_parttype(self) -> String {
        match self {
            Classification::Known(parttype) | Classification::Unknown(parttype) => parttype,
        }
    }
}

/// Classifies raw part identifiers into canonical part types
#[derive(Debug, Clone)]
pub struct PartClassifier {
    parttypes: HashMap<String, String>,
    rules: Vec<ClassificationRule>,
}

impl PartClassifier {
    /// Classifier with only the built-in aliases and rules
    pub fn new() -> Result<Self> {
        Self::with_extensions(&HashMap::new(), &[])
    }

    /// Built-ins extended by configuration
    ///
    /// Extra aliases override built-in ones with the same identifier; extra
    /// rules are tried before the built-in rules, in the given order.
    pub fn with_extensions(
        extra_parttypes: &HashMap<String, String>,
        extra_rules: &[RuleSpec],
    ) -> Result<Self> {
        let mut parttypes: HashMap<String, String> = BUILTIN_PARTTYPES
            .iter()
            .map(|(part, parttype)| (part.to_string(), parttype.to_string()))
            .collect();
        for (part, parttype) in extra_parttypes {
            parttypes.insert(part.trim().to_lowercase(), parttype.trim().to_lowercase());
        }

        let mut rules = Vec::with_capacity(extra_rules.len() + BUILTIN_RULES.len());
        for spec in extra_rules {
            rules.push(ClassificationRule::new(
                spec.parttype.trim().to_lowercase(),
                &spec.pattern,
            )?);
        }
        for (parttype, pattern) in BUILTIN_RULES {
            rules.push(ClassificationRule::new(*parttype, pattern)?);
        }

        Ok(Self { parttypes, rules })
    }

    /// The ordered pattern rules
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Canonical type for a known identifier, `None` if nothing matches
    pub fn classify_known(&self, part: &str) -> Option<&str> {
        if let Some(parttype) = self.parttypes.get(part) {
            return Some(parttype.as_str());
        }

        self.rules
            .iter()
            .find(|rule| rule.is_match(part))
            .map(|rule| rule.parttype.as_str())
    }

    /// Canonical type for an identifier
    ///
    /// Unknown identifiers are their own type, so they still aggregate
    /// consistently with each other. Reporting them is left to the caller.
    pub fn classify(&self, part: &str) -> Classification {
        match self.classify_known(part) {
            Some(parttype) => Classification::Known(parttype.to_string()),
            None => Classification::Unknown(part.to_string()),
        }
    }
}

impl Default for PartClassifier {
    fn default() -> Self {
        Self::new().expect("built-in part-type patterns are valid")
    }
}
