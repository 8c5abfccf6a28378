//! Schema definition types.
//!
//! A [`SchemaDefinition`] describes one (array, product) pair: the filename
//! template, the dimension table, coordinate and data variable specs, the
//! global attribute requirements and the native mapping table. Definitions
//! are built by the [`crate::SchemaRegistry`] from YAML and never change
//! afterwards.

use std::sync::Arc;

use ac1_common::filename::{parse_filename, ContentType, OceanSitesFilename};
use ac1_common::time::parse_compact;
use ac1_common::{AttrValue, Attributes, DataType};
use serde::{Deserialize, Serialize};

use crate::mapping::MappingTable;
use crate::profile::Profile;

/// netCDF default fill value for float and double variables.
pub const DEFAULT_FILL: f64 = 9.969209968386869e36;

// ============================================================================
// Requirement levels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    #[default]
    Mandatory,
    HighlyDesired,
    Suggested,
}

impl Requirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Requirement::Mandatory => "mandatory",
            Requirement::HighlyDesired => "highly_desired",
            Requirement::Suggested => "suggested",
        }
    }
}

// ============================================================================
// Dimensions and variables
// ============================================================================

/// A dimension of a product: fixed size, any size, or unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub name: String,
    /// Exact size; `None` accepts any length
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub unlimited: bool,
}

/// Target variable definition with the attributes it must carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    #[serde(default)]
    pub dims: Vec<String>,
    pub dtype: DataType,
    #[serde(default)]
    pub requirement: Requirement,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub standard_name: Option<String>,
    /// Controlled vocabulary URL of the standard name
    #[serde(default)]
    pub vocabulary: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub fill_value: Option<f64>,
    #[serde(default)]
    pub valid_min: Option<f64>,
    #[serde(default)]
    pub valid_max: Option<f64>,
    #[serde(default)]
    pub axis: Option<String>,
    #[serde(default)]
    pub positive: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl VariableSpec {
    pub fn is_mandatory(&self) -> bool {
        self.requirement == Requirement::Mandatory
    }

    /// `_FillValue` typed like the variable.
    pub fn fill_attr(&self) -> Option<AttrValue> {
        self.fill_value.and_then(|v| AttrValue::numeric(self.dtype, v))
    }

    /// Variable attributes written by the converter.
    pub fn attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        let text = [
            ("long_name", &self.long_name),
            ("standard_name", &self.standard_name),
            ("vocabulary", &self.vocabulary),
            ("units", &self.units),
            ("axis", &self.axis),
            ("positive", &self.positive),
            ("comment", &self.comment),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                attrs.insert(key.to_string(), AttrValue::from(value.as_str()));
            }
        }
        if let Some(fill) = self.fill_attr() {
            attrs.insert("_FillValue".to_string(), fill);
        }
        let range = [("valid_min", self.valid_min), ("valid_max", self.valid_max)];
        for (key, value) in range {
            if let Some(v) = value.and_then(|v| AttrValue::numeric(self.dtype, v)) {
                attrs.insert(key.to_string(), v);
            }
        }
        attrs
    }
}

// ============================================================================
// Global attributes
// ============================================================================

/// Values the assembler computes from the dataset, the schema or the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedField {
    SiteCode,
    Array,
    FeatureType,
    CdmDataType,
    TimeCoverageStart,
    TimeCoverageEnd,
    GeospatialLatMin,
    GeospatialLatMax,
    GeospatialLonMin,
    GeospatialLonMax,
    GeospatialVerticalMin,
    GeospatialVerticalMax,
    ContributorName,
    ContributorEmail,
    ContributorId,
    ContributorRole,
    ContributingInstitutions,
    ContributingInstitutionsVocabulary,
    ContributingInstitutionsRole,
    Id,
    DateCreated,
}

/// Where the assembler takes an attribute's value from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttrSource {
    /// A constant written verbatim.
    Fixed { value: String },
    /// A metadata record entry; the key defaults to the attribute name.
    Record {
        #[serde(default)]
        key: Option<String>,
    },
    /// Computed from the dataset, the schema or the record.
    Derived { field: DerivedField },
}

impl Default for AttrSource {
    fn default() -> Self {
        AttrSource::Record { key: None }
    }
}

/// Constraint on a global attribute's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueRule {
    OneOf { values: Vec<String> },
    Equals { value: String },
    /// Comma-separated list containing every entry, e.g. `Conventions`
    ContainsAll { values: Vec<String> },
    /// `YYYYMMDDTHHMMSS`
    CompactTimestamp,
    /// Comma-separated http(s) URLs
    Url,
    /// Comma-separated ORCID URLs; blank entries are allowed
    OrcidList,
    /// OceanSITES filename stem
    OceanSitesId,
}

impl ValueRule {
    /// Check a value, returning a description of the violation.
    pub fn check(&self, value: &AttrValue) -> Result<(), String> {
        let text = value.to_string();
        let text = text.trim();
        match self {
            ValueRule::OneOf { values } => {
                if values.iter().any(|v| v == text) {
                    Ok(())
                } else {
                    Err(format!("'{}' is not one of {:?}", text, values))
                }
            }
            ValueRule::Equals { value } => {
                if value == text {
                    Ok(())
                } else {
                    Err(format!("expected '{}', got '{}'", value, text))
                }
            }
            ValueRule::ContainsAll { values } => {
                let present: Vec<&str> = split_list(text).collect();
                match values.iter().find(|v| !present.contains(&v.as_str())) {
                    None => Ok(()),
                    Some(missing) => Err(format!("must include '{}'", missing)),
                }
            }
            ValueRule::CompactTimestamp => parse_compact(text)
                .map(|_| ())
                .map_err(|_| format!("'{}' must use format YYYYMMDDTHHMMSS", text)),
            ValueRule::Url => match split_list(text).find(|u| !is_url(u)) {
                None if !text.is_empty() => Ok(()),
                None => Err("expected at least one URL".to_string()),
                Some(bad) => Err(format!("'{}' is not an http(s) URL", bad)),
            },
            ValueRule::OrcidList => match split_list(text).find(|id| !is_orcid(id)) {
                None => Ok(()),
                Some(bad) => Err(format!(
                    "invalid ORCID '{}', expected https://orcid.org/XXXX-XXXX-XXXX-XXXX",
                    bad
                )),
            },
            ValueRule::OceanSitesId => parse_filename(&format!("{}.nc", text))
                .map(|_| ())
                .map_err(|e| format!("'{}' is not an OceanSITES id: {}", text, e)),
        }
    }
}

/// Non-blank entries of a comma-separated list.
fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn is_url(s: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| s.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}

/// `https://orcid.org/dddd-dddd-dddd-dddX`
fn is_orcid(s: &str) -> bool {
    let Some(id) = s.strip_prefix("https://orcid.org/") else {
        return false;
    };
    let groups: Vec<&str> = id.split('-').collect();
    groups.len() == 4
        && groups.iter().enumerate().all(|(i, g)| {
            g.len() == 4
                && g.bytes().enumerate().all(|(j, b)| {
                    b.is_ascii_digit() || (i == 3 && j == 3 && b == b'X')
                })
        })
}

/// Requirement and provenance of one global attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalAttributeSpec {
    pub name: String,
    #[serde(default)]
    pub requirement: Requirement,
    #[serde(default)]
    pub source: AttrSource,
    #[serde(default)]
    pub rule: Option<ValueRule>,
}

impl GlobalAttributeSpec {
    /// The rule the checker applies: the declared one, or equality with a
    /// fixed value.
    pub fn effective_rule(&self) -> Option<ValueRule> {
        match (&self.rule, &self.source) {
            (Some(rule), _) => Some(rule.clone()),
            (None, AttrSource::Fixed { value }) => Some(ValueRule::Equals {
                value: value.clone(),
            }),
            _ => None,
        }
    }
}

// ============================================================================
// Schema definition
// ============================================================================

/// Filename template: `OS_<site>_<start>-<end>_<content_type>_<tag>.nc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameTemplate {
    pub content_type: ContentType,
    pub tag: String,
}

/// Fully resolved definition of one (array, product) pair.
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    pub array: String,
    pub product: String,
    pub site_code: String,
    pub description: Option<String>,
    pub template: FilenameTemplate,
    pub dimensions: Vec<DimensionSpec>,
    pub forbidden_dimensions: Vec<String>,
    pub coordinates: Vec<VariableSpec>,
    pub variables: Vec<VariableSpec>,
    pub global_attributes: Vec<GlobalAttributeSpec>,
    pub mapping: MappingTable,
    pub profile: Arc<Profile>,
}

impl SchemaDefinition {
    pub fn dimension(&self, name: &str) -> Option<&DimensionSpec> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn coordinate(&self, name: &str) -> Option<&VariableSpec> {
        self.coordinates.iter().find(|v| v.name == name)
    }

    pub fn data_variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Coordinate or data variable spec by name.
    pub fn variable(&self, name: &str) -> Option<&VariableSpec> {
        self.coordinate(name).or_else(|| self.data_variable(name))
    }

    pub fn global_attribute(&self, name: &str) -> Option<&GlobalAttributeSpec> {
        self.global_attributes.iter().find(|a| a.name == name)
    }

    /// Whether a decoded filename belongs to this product.
    pub fn matches_filename(&self, filename: &OceanSitesFilename) -> bool {
        filename.site_code == self.site_code
            && filename.content_type == self.template.content_type
            && filename.resolution_tag == self.template.tag
    }

    /// Human-readable filename pattern, e.g.
    /// `OS_RAPID_<start>-<end>_DPR_transports_T12H.nc`.
    pub fn filename_pattern(&self) -> String {
        format!(
            "OS_{}_<start>-<end>_{}_{}.nc",
            self.site_code, self.template.content_type, self.template.tag
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orcid_form() {
        assert!(is_orcid("https://orcid.org/0000-0001-8676-7779"));
        assert!(is_orcid("https://orcid.org/0000-0002-1825-009X"));
        assert!(!is_orcid("https://orcid.org/0000-0001-8676-777"));
        assert!(!is_orcid("http://orcid.org/0000-0001-8676-7779"));
        assert!(!is_orcid("https://orcid.org/0000-000X-8676-7779"));
    }

    #[test]
    fn test_value_rules() {
        let conventions = ValueRule::ContainsAll {
            values: vec!["CF-1.8".into(), "ACDD-1.3".into()],
        };
        assert!(conventions.check(&"CF-1.8, OceanSITES-1.4, ACDD-1.3".into()).is_ok());
        assert!(conventions.check(&"CF-1.8".into()).is_err());

        let mode = ValueRule::OneOf {
            values: vec!["R".into(), "P".into(), "D".into()],
        };
        assert!(mode.check(&"D".into()).is_ok());
        assert!(mode.check(&"X".into()).is_err());

        assert!(ValueRule::CompactTimestamp.check(&"20040402T000000".into()).is_ok());
        assert!(ValueRule::CompactTimestamp.check(&"2004-04-02".into()).is_err());

        assert!(ValueRule::Url
            .check(&"https://edmo.seadatanet.org/report/17, https://ror.org/00874hx02".into())
            .is_ok());
        assert!(ValueRule::Url.check(&"edmo 17".into()).is_err());
        assert!(ValueRule::Url.check(&"".into()).is_err());

        assert!(ValueRule::OrcidList
            .check(&"https://orcid.org/0000-0001-8676-7779, ".into())
            .is_ok());
        assert!(ValueRule::OrcidList.check(&"0000-0001".into()).is_err());

        assert!(ValueRule::OceanSitesId
            .check(&"OS_RAPID_20040402-20040403_DPR_transports_T12H".into())
            .is_ok());
        assert!(ValueRule::OceanSitesId.check(&"RAPID_transports".into()).is_err());
    }

    #[test]
    fn test_fixed_source_implies_equality() {
        let spec = GlobalAttributeSpec {
            name: "format_version".into(),
            requirement: Requirement::Mandatory,
            source: AttrSource::Fixed { value: "1.4".into() },
            rule: None,
        };
        let rule = spec.effective_rule().unwrap();
        assert!(rule.check(&"1.4".into()).is_ok());
        assert!(rule.check(&"1.3".into()).is_err());
    }

    #[test]
    fn test_variable_attributes_typed_fill() {
        let spec = VariableSpec {
            name: "TRANSPORT".into(),
            dims: vec!["N_COMPONENT".into(), "TIME".into()],
            dtype: DataType::Float32,
            requirement: Requirement::Mandatory,
            long_name: Some("Volume transport".into()),
            standard_name: None,
            vocabulary: None,
            units: Some("sverdrup".into()),
            fill_value: Some(DEFAULT_FILL),
            valid_min: Some(-100.0),
            valid_max: None,
            axis: None,
            positive: None,
            comment: None,
        };
        let attrs = spec.attributes();
        assert_eq!(attrs.get("units"), Some(&AttrValue::from("sverdrup")));
        assert_eq!(attrs.get("_FillValue").map(|v| v.dtype()), Some(DataType::Float32));
        assert_eq!(attrs.get("valid_min"), Some(&AttrValue::Float32(-100.0)));
        assert!(!attrs.contains_key("standard_name"));
    }
}
