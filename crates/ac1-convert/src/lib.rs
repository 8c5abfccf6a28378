//! AC1 format converter.
//!
//! Turns a native observing-array dataset into an AC1 dataset:
//!
//! - [`mapper`]: renames, reorders, stacks and unit-converts native variables
//!   following the schema's mapping table
//! - [`assembler`]: writes the global attributes from the schema, the
//!   dataset and a [`MetadataRecord`]
//! - [`pipeline`]: runs both and names the output file

pub mod assembler;
pub mod error;
pub mod mapper;
pub mod metadata;
pub mod pipeline;

pub use assembler::{apply_metadata, apply_metadata_at, filename_for};
pub use error::{ConversionError, Result};
pub use mapper::{map_dataset, MappingOutput};
pub use metadata::{
    Contributor, ContributorDirectory, DirectoryEntry, Institution, MetadataRecord, TimeCoverage,
};
pub use pipeline::{to_ac1, to_ac1_at, Conversion};
