//! Attribute assembler: writes the AC1 global attributes.
//!
//! Every global attribute of a schema names its source: a fixed value, a
//! metadata record entry, or a value derived from the dataset (time and
//! geographic coverage, feature type, filename id) or from the record's
//! contributor and institution lists. Applying the same record twice only
//! appends to `history`.

use ac1_common::time::from_epoch_seconds;
use ac1_common::{
    format_compact, is_vertical, AttrValue, Dataset, GeoBounds, OceanSitesFilename, TimeUnits,
    LATITUDE, LONGITUDE, TIME,
};
use ac1_schema::{AttrSource, DerivedField, Requirement, SchemaDefinition};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{ConversionError, Result};
use crate::metadata::{ContributorDirectory, MetadataRecord};

const HISTORY: &str = "history";
const DATE_CREATED: &str = "date_created";

/// [`apply_metadata_at`] with the current time.
pub fn apply_metadata(
    dataset: &Dataset,
    schema: &SchemaDefinition,
    record: &MetadataRecord,
) -> Result<Dataset> {
    apply_metadata_at(dataset, schema, record, Utc::now())
}

/// Return a copy of `dataset` carrying the schema's global attributes, the
/// profile's encoding hints and one more `history` line stamped `now`.
pub fn apply_metadata_at(
    dataset: &Dataset,
    schema: &SchemaDefinition,
    record: &MetadataRecord,
    now: DateTime<Utc>,
) -> Result<Dataset> {
    let resolver = Resolver {
        dataset,
        schema,
        record,
        directory: record.directory(),
        now,
    };

    let mut resolved = Vec::with_capacity(schema.global_attributes.len());
    for spec in &schema.global_attributes {
        if spec.name == DATE_CREATED && has_value(dataset, DATE_CREATED) {
            continue;
        }
        match resolver.resolve(&spec.name, &spec.source) {
            Some(value) => resolved.push((spec.name.as_str(), value)),
            None if has_value(dataset, &spec.name) => {}
            None if spec.requirement == Requirement::Mandatory => {
                return Err(ConversionError::MissingMetadata(spec.name.clone()));
            }
            None => debug!(attribute = %spec.name, "Optional attribute unresolved"),
        }
    }

    let mut out = dataset.clone();
    let written = resolved.len();
    for (name, value) in resolved {
        out.set_attr(name, value);
    }
    out.encoding = Some(schema.profile.encoding.clone());

    let line = format!(
        "{}: AC1 metadata applied for {} {} (ac1-convert {})",
        format_compact(&now),
        schema.array,
        schema.product,
        env!("CARGO_PKG_VERSION")
    );
    let history = match out.text_attr(HISTORY).map(str::trim_end) {
        Some(existing) if !existing.is_empty() => format!("{}\n{}", existing, line),
        _ => line,
    };
    out.set_attr(HISTORY, history);

    info!(
        array = %schema.array,
        product = %schema.product,
        attributes = written,
        "Applied global attributes"
    );
    Ok(out)
}

/// Filename of `dataset` under `schema`, dated by the TIME coordinate or,
/// failing that, the record's temporal coverage.
pub fn filename_for(
    dataset: &Dataset,
    schema: &SchemaDefinition,
    record: &MetadataRecord,
) -> Result<OceanSitesFilename> {
    let (start, end) = match time_range(dataset) {
        Some((start, end)) => (start.date_naive(), end.date_naive()),
        None => {
            let coverage = record
                .time_coverage
                .ok_or_else(|| ConversionError::MissingMetadata("time_coverage".to_string()))?;
            (coverage.start, coverage.end)
        }
    };
    Ok(OceanSitesFilename::new(
        &schema.site_code,
        start,
        end,
        schema.template.content_type,
        &schema.template.tag,
    )?)
}

fn has_value(dataset: &Dataset, name: &str) -> bool {
    dataset.attr(name).is_some_and(|v| !v.is_empty())
}

/// First and last instant of the TIME coordinate, decoded with its units.
fn time_range(dataset: &Dataset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let time = dataset.coord(TIME)?;
    let (lo, hi) = time.data().finite_extrema()?;
    let units = match time.text_attr("units") {
        Some(units) => TimeUnits::parse(units).ok()?,
        None => TimeUnits::ac1(),
    };
    let start = from_epoch_seconds(units.to_epoch_seconds(lo)).ok()?;
    let end = from_epoch_seconds(units.to_epoch_seconds(hi)).ok()?;
    Some((start, end))
}

// ============================================================================
// Resolution
// ============================================================================

struct Resolver<'a> {
    dataset: &'a Dataset,
    schema: &'a SchemaDefinition,
    record: &'a MetadataRecord,
    directory: ContributorDirectory,
    now: DateTime<Utc>,
}

impl Resolver<'_> {
    fn resolve(&self, name: &str, source: &AttrSource) -> Option<AttrValue> {
        let value = match source {
            AttrSource::Fixed { value } => Some(AttrValue::from(value.as_str())),
            AttrSource::Record { key } => self
                .record
                .lookup(key.as_deref().unwrap_or(name))
                .map(AttrValue::from),
            AttrSource::Derived { field } => self
                .derive(*field)
                .or_else(|| self.record.lookup(name).map(AttrValue::from)),
        };
        value.filter(|v| !v.is_empty())
    }

    fn derive(&self, field: DerivedField) -> Option<AttrValue> {
        let record = self.record;
        match field {
            DerivedField::SiteCode => Some(self.schema.site_code.as_str().into()),
            DerivedField::Array => Some(self.schema.array.as_str().into()),
            DerivedField::FeatureType => Some(
                if self.is_profile() {
                    "timeSeriesProfile"
                } else {
                    "timeSeries"
                }
                .into(),
            ),
            DerivedField::CdmDataType => Some(
                if self.is_profile() {
                    "TimeSeriesProfile"
                } else {
                    "TimeSeries"
                }
                .into(),
            ),
            DerivedField::TimeCoverageStart => self.coverage().map(|(start, _)| start.into()),
            DerivedField::TimeCoverageEnd => self.coverage().map(|(_, end)| end.into()),
            DerivedField::GeospatialLatMin => self.latitudes().map(|(lo, _)| lo.into()),
            DerivedField::GeospatialLatMax => self.latitudes().map(|(_, hi)| hi.into()),
            DerivedField::GeospatialLonMin => self.longitudes().map(|(lo, _)| lo.into()),
            DerivedField::GeospatialLonMax => self.longitudes().map(|(_, hi)| hi.into()),
            DerivedField::GeospatialVerticalMin => self.vertical().map(|(lo, _)| lo.into()),
            DerivedField::GeospatialVerticalMax => self.vertical().map(|(_, hi)| hi.into()),
            DerivedField::ContributorName => {
                join(record.contributors.iter().map(|c| Some(c.name.as_str())))
            }
            DerivedField::ContributorEmail => {
                join(record.contributors.iter().map(|c| c.email.as_deref()))
            }
            DerivedField::ContributorId => self.contributor_ids(),
            DerivedField::ContributorRole => {
                join(record.contributors.iter().map(|c| c.role.as_deref()))
            }
            DerivedField::ContributingInstitutions => {
                join(record.institutions.iter().map(|i| Some(i.name.as_str())))
            }
            DerivedField::ContributingInstitutionsVocabulary => {
                join(record.institutions.iter().map(|i| i.vocabulary.as_deref()))
            }
            DerivedField::ContributingInstitutionsRole => {
                join(record.institutions.iter().map(|i| i.role.as_deref()))
            }
            DerivedField::Id => filename_for(self.dataset, self.schema, record)
                .ok()
                .map(|f| f.stem().into()),
            DerivedField::DateCreated => Some(format_compact(&self.now).into()),
        }
    }

    fn is_profile(&self) -> bool {
        self.dataset.dimensions().iter().any(|d| is_vertical(&d.name))
    }

    fn coverage(&self) -> Option<(String, String)> {
        if let Some((start, end)) = time_range(self.dataset) {
            return Some((format_compact(&start), format_compact(&end)));
        }
        let coverage = self.record.time_coverage?;
        let start = coverage.start.and_hms_opt(0, 0, 0)?.and_utc();
        let end = coverage.end.and_hms_opt(0, 0, 0)?.and_utc();
        Some((format_compact(&start), format_compact(&end)))
    }

    fn coord_extrema(&self, name: &str) -> Option<(f64, f64)> {
        self.dataset.coord(name)?.data().finite_extrema()
    }

    fn latitudes(&self) -> Option<(f64, f64)> {
        self.coord_extrema(LATITUDE)
            .or_else(|| self.record_bounds().map(|g| (g.lat_min, g.lat_max)))
    }

    fn longitudes(&self) -> Option<(f64, f64)> {
        self.coord_extrema(LONGITUDE)
            .or_else(|| self.record_bounds().map(|g| (g.lon_min, g.lon_max)))
    }

    /// The record's bounds, unless out of range or inverted.
    fn record_bounds(&self) -> Option<GeoBounds> {
        let bounds = self.record.geospatial?;
        if !bounds.is_valid() {
            warn!(?bounds, "Ignoring invalid geospatial bounds in metadata record");
            return None;
        }
        Some(bounds)
    }

    fn vertical(&self) -> Option<(f64, f64)> {
        self.coord_extrema("DEPTH")
            .or_else(|| self.coord_extrema("PRESSURE"))
    }

    /// ORCIDs in contributor order. Contributors without one are looked up
    /// in the directory; unknown ones leave an empty entry.
    fn contributor_ids(&self) -> Option<AttrValue> {
        let array = self.record.array.as_deref().unwrap_or(&self.schema.array);
        let ids = self.record.contributors.iter().map(|c| {
            let id = c
                .orcid
                .as_deref()
                .or_else(|| self.directory.lookup(array, &c.name));
            if id.is_none() {
                warn!(array, contributor = %c.name, "No ORCID known for contributor");
            }
            id
        });
        join(ids)
    }
}

/// Comma-join entries, keeping blanks for missing ones so positions line up
/// across the contributor attributes. `None` when every entry is blank.
fn join<'s>(entries: impl Iterator<Item = Option<&'s str>>) -> Option<AttrValue> {
    let entries: Vec<&str> = entries.map(|e| e.map(str::trim).unwrap_or("")).collect();
    if entries.iter().all(|e| e.is_empty()) {
        return None;
    }
    Some(entries.join(", ").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_keeps_positions() {
        let joined = join([Some("a"), None, Some(" c ")].into_iter());
        assert_eq!(joined, Some(AttrValue::from("a, , c")));
        assert_eq!(join([None, Some("")].into_iter()), None);
        assert_eq!(join(std::iter::empty()), None);
    }
}
