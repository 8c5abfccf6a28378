//! AC1 schema registry.
//!
//! Schemas are declared in YAML: a shared profile (`ac1.yaml`: approved
//! units, unit aliases, vocabularies, coordinate templates and global
//! attribute requirements) and one file per observing array listing its
//! products. Each product resolves into a [`SchemaDefinition`] that drives
//! both the converter and the compliance checker.

pub mod definition;
pub mod error;
pub mod mapping;
pub mod profile;
pub mod registry;

pub use definition::{
    AttrSource, DerivedField, DimensionSpec, FilenameTemplate, GlobalAttributeSpec, Requirement,
    SchemaDefinition, ValueRule, VariableSpec, DEFAULT_FILL,
};
pub use error::{SchemaError, SchemaResult};
pub use mapping::{
    CoordinateMapping, CoordinateSource, DirectMapping, MappingTable, StackComponent,
    StackMapping, UnitConversion, VariableMapping,
};
pub use profile::{Profile, UnitAlias, AC1_UNITS};
pub use registry::{SchemaRegistry, PROFILE_FILE};
