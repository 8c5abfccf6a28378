//! End-to-end conversion: map, apply metadata, name the file.

use ac1_common::Dataset;
use ac1_schema::SchemaRegistry;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::assembler::{apply_metadata_at, filename_for};
use crate::error::Result;
use crate::mapper::map_dataset;
use crate::metadata::MetadataRecord;

/// Result of a conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub dataset: Dataset,
    /// OceanSITES filename, e.g. `OS_RAPID_20040402-20230211_DPR_transports_T12H.nc`
    pub filename: String,
    /// Optional mappings skipped for lack of a native variable
    pub warnings: Vec<String>,
}

/// Convert a native dataset of `array`/`product` into an AC1 dataset.
pub fn to_ac1(
    native: &Dataset,
    registry: &SchemaRegistry,
    array: &str,
    product: &str,
    record: &MetadataRecord,
) -> Result<Conversion> {
    to_ac1_at(native, registry, array, product, record, Utc::now())
}

/// [`to_ac1`] with an explicit clock.
pub fn to_ac1_at(
    native: &Dataset,
    registry: &SchemaRegistry,
    array: &str,
    product: &str,
    record: &MetadataRecord,
    now: DateTime<Utc>,
) -> Result<Conversion> {
    let schema = registry.get_schema(array, product)?;
    info!(array, product, "Converting native dataset");

    let mapped = map_dataset(native, &schema.mapping, schema)?;
    for warning in &mapped.warnings {
        warn!(array, product, %warning, "Mapping incomplete");
    }
    info!(
        variables = mapped.dataset.variables().count(),
        "Mapped variables"
    );

    let dataset = apply_metadata_at(&mapped.dataset, schema, record, now)?;
    let filename = filename_for(&dataset, schema, record)?.to_string();
    info!(%filename, "Conversion complete");

    Ok(Conversion {
        dataset,
        filename,
        warnings: mapped.warnings,
    })
}
