//! Native-to-AC1 mapping tables.
//!
//! Each array's native files are described by a [`MappingTable`]: which
//! native variables feed which target variables, how their units are
//! converted and how their axes are reordered.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Unit conversion applied while mapping a variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitConversion {
    /// Values pass through; only the `units` label changes.
    #[default]
    Identity,
    /// Multiply every value by `factor`.
    Scale { factor: f64 },
    /// Resolve the native `units` attribute through the alias table.
    Lookup,
}

/// One native variable copied into one target variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMapping {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub conversion: UnitConversion,
    /// Output axis `i` is native axis `permutation[i]`
    #[serde(default)]
    pub permutation: Option<Vec<usize>>,
    #[serde(default = "default_true")]
    pub required: bool,
}

/// One member of a stacked mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackComponent {
    pub source: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Several one-dimensional native series stacked along the component
/// dimension, e.g. the eight RAPID transport components into
/// `TRANSPORT(N_COMPONENT, TIME)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackMapping {
    pub target: String,
    pub components: Vec<StackComponent>,
    #[serde(default)]
    pub conversion: UnitConversion,
    #[serde(default = "default_true")]
    pub required: bool,
    /// String variable receiving the component names
    #[serde(default)]
    pub name_variable: Option<String>,
    /// String variable receiving the component descriptions
    #[serde(default)]
    pub description_variable: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableMapping {
    Direct(DirectMapping),
    Stack(StackMapping),
}

impl VariableMapping {
    /// Target variables this mapping writes, including stacked name and
    /// description variables.
    pub fn targets(&self) -> Vec<&str> {
        match self {
            VariableMapping::Direct(m) => vec![m.target.as_str()],
            VariableMapping::Stack(m) => std::iter::once(m.target.as_str())
                .chain(m.name_variable.as_deref())
                .chain(m.description_variable.as_deref())
                .collect(),
        }
    }
}

/// Where a target coordinate's values come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoordinateSource {
    /// A native variable; TIME is re-encoded from its CF units.
    Variable {
        name: String,
        #[serde(default)]
        conversion: UnitConversion,
    },
    /// Constant values, e.g. the RAPID section latitude.
    Fixed { values: Vec<f64> },
    /// `0..n`, with `n` the schema's fixed dimension size.
    Index,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapping {
    pub target: String,
    pub source: CoordinateSource,
}

/// All mappings for one product's native file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingTable {
    #[serde(default)]
    pub coordinates: Vec<CoordinateMapping>,
    #[serde(default)]
    pub variables: Vec<VariableMapping>,
}
