//! The AC1 profile: rules shared by every array and product.

use std::collections::BTreeMap;

use ac1_common::{EncodingHints, TimeUnits};
use serde::{Deserialize, Serialize};

use crate::definition::{GlobalAttributeSpec, VariableSpec};

fn default_factor() -> f64 {
    1.0
}

/// Canonical unit an alias resolves to, with the multiplier that converts
/// values into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitAlias {
    pub unit: String,
    #[serde(default = "default_factor")]
    pub factor: f64,
}

/// The AC1 units vocabulary. A profile may approve a subset of it, never
/// anything outside it.
pub const AC1_UNITS: [&str; 10] = [
    "sverdrup",
    "petawatt",
    "degree_Celsius",
    "degree_north",
    "degree_east",
    "m",
    "dbar",
    "kg m-3",
    "1",
    "m s-1",
];

/// Shared conventions loaded from `ac1.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Closed set of compliant units strings
    pub approved_units: Vec<String>,
    #[serde(default)]
    pub unit_aliases: BTreeMap<String, UnitAlias>,
    /// Vocabulary URL per CF standard name
    #[serde(default)]
    pub vocabularies: BTreeMap<String, String>,
    pub conventions: Vec<String>,
    #[serde(default)]
    pub prohibited_prefixes: Vec<String>,
    #[serde(default)]
    pub encoding: EncodingHints,
    /// Coordinate templates referenced by name from product definitions
    #[serde(default)]
    pub coordinates: Vec<VariableSpec>,
    #[serde(default)]
    pub global_attributes: Vec<GlobalAttributeSpec>,
}

impl Profile {
    pub fn is_approved_unit(&self, units: &str) -> bool {
        self.approved_units.iter().any(|u| u == units)
    }

    /// Whether `units` is a `<unit> since <reference>` time encoding.
    pub fn is_time_units(units: &str) -> bool {
        TimeUnits::parse(units).is_ok()
    }

    /// Resolve a native units string to an approved unit and a value factor.
    /// Approved units resolve to themselves.
    pub fn resolve_unit(&self, native: &str) -> Option<UnitAlias> {
        let native = native.trim();
        if self.is_approved_unit(native) {
            return Some(UnitAlias {
                unit: native.to_string(),
                factor: 1.0,
            });
        }
        self.unit_aliases.get(native).cloned()
    }

    pub fn vocabulary_for(&self, standard_name: &str) -> Option<&str> {
        self.vocabularies.get(standard_name).map(String::as_str)
    }

    pub fn coordinate(&self, name: &str) -> Option<&VariableSpec> {
        self.coordinates.iter().find(|c| c.name == name)
    }

    pub fn is_prohibited(&self, attribute: &str) -> bool {
        self.prohibited_prefixes
            .iter()
            .any(|p| attribute.starts_with(p.as_str()))
    }
}
