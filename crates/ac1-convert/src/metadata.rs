//! Per-array metadata records.
//!
//! A [`MetadataRecord`] holds the provenance facts a native file does not
//! carry: contributors, institutions, acknowledgement, DOIs, licence and
//! coverage, plus free-form attributes keyed by their AC1 name. Records are
//! YAML documents with `${VAR}` / `${VAR:-default}` expansion.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ac1_common::{expand_env_vars, GeoBounds};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// ORCID URL, e.g. `https://orcid.org/0000-0001-8676-7779`
    #[serde(default)]
    pub orcid: Option<String>,
    /// Role term from the W08 vocabulary, e.g. `Principal Investigator`
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub name: String,
    /// EDMO or ROR URL of the institution
    #[serde(default)]
    pub vocabulary: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Temporal coverage used when the TIME coordinate has no finite values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCoverage {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Known ORCID of a contributor of an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub array: String,
    pub name: String,
    pub orcid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(default)]
    pub array: Option<String>,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    #[serde(default)]
    pub institutions: Vec<Institution>,
    #[serde(default)]
    pub acknowledgement: Option<String>,
    #[serde(default)]
    pub source_dois: Vec<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub geospatial: Option<GeoBounds>,
    #[serde(default)]
    pub time_coverage: Option<TimeCoverage>,
    /// Global attributes by AC1 name, e.g. `title`, `summary`, `source`
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Extra ORCID directory entries, consulted before the built-in ones
    #[serde(default)]
    pub directory: Vec<DirectoryEntry>,
}

impl MetadataRecord {
    /// Parse a YAML record after environment expansion. `origin` labels
    /// error messages.
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self> {
        let parse_error = |reason: String| ConversionError::RecordParse {
            origin: origin.to_string(),
            reason,
        };
        let expanded = expand_env_vars(content).map_err(|e| parse_error(e.to_string()))?;
        serde_yaml::from_str(&expanded).map_err(|e| parse_error(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConversionError::RecordIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&content, &path.display().to_string())
    }

    /// Value of a record-sourced global attribute. Free-form attributes win
    /// over the structured fields.
    pub fn lookup(&self, key: &str) -> Option<String> {
        if let Some(value) = self.attributes.get(key) {
            return Some(value.clone());
        }
        match key {
            "source_acknowledgement" | "acknowledgement" => self.acknowledgement.clone(),
            "doi" => (!self.source_dois.is_empty()).then(|| self.source_dois.join(", ")),
            "license" => self.license.clone(),
            _ => None,
        }
    }

    /// ORCID directory for this record: its own entries, then the built-in
    /// ones.
    pub fn directory(&self) -> ContributorDirectory {
        let mut directory = ContributorDirectory::builtin();
        for entry in &self.directory {
            directory.insert(&entry.array, &entry.name, &entry.orcid);
        }
        directory
    }
}

// ============================================================================
// Contributor directory
// ============================================================================

/// ORCIDs keyed by (array, contributor name).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributorDirectory {
    entries: BTreeMap<(String, String), String>,
}

impl ContributorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory with the ORCIDs shipped with the toolkit.
    pub fn builtin() -> Self {
        let mut directory = Self::new();
        for name in ["Ben Moat", "Ben I. Moat"] {
            directory.insert("RAPID", name, "https://orcid.org/0000-0001-8676-7779");
        }
        directory
    }

    pub fn insert(&mut self, array: &str, name: &str, orcid: &str) {
        self.entries.insert(
            (array.to_ascii_uppercase(), name.trim().to_string()),
            orcid.to_string(),
        );
    }

    pub fn lookup(&self, array: &str, name: &str) -> Option<&str> {
        self.entries
            .get(&(array.to_ascii_uppercase(), name.trim().to_string()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"
array: RAPID
contributors:
  - name: Ben Moat
    email: ben.moat@noc.ac.uk
    role: Principal Investigator
institutions:
  - name: National Oceanography Centre (Southampton) (UK)
    vocabulary: https://edmo.seadatanet.org/report/17
    role: Owner
acknowledgement: Data from the RAPID AMOC observing project.
source_dois:
  - https://doi.org/10.5285/aaa
  - https://doi.org/10.5285/bbb
license: CC-BY 4.0
geospatial: {lat_min: 26.5, lat_max: 26.5, lon_min: -80.0, lon_max: -13.0}
attributes:
  title: RAPID-MOCHA transport time series
  license: CC0
directory:
  - {array: rapid, name: Eleanor Frajka-Williams, orcid: "https://orcid.org/0000-0001-8773-7838"}
"#;

    #[test]
    fn test_parse_record() {
        let record = MetadataRecord::from_yaml(RECORD, "test").unwrap();
        assert_eq!(record.contributors.len(), 1);
        assert_eq!(record.institutions[0].role.as_deref(), Some("Owner"));
        assert_eq!(record.geospatial, Some(GeoBounds::new(26.5, 26.5, -80.0, -13.0)));
        assert!(record.time_coverage.is_none());
    }

    #[test]
    fn test_lookup() {
        let record = MetadataRecord::from_yaml(RECORD, "test").unwrap();
        assert_eq!(
            record.lookup("title").as_deref(),
            Some("RAPID-MOCHA transport time series")
        );
        assert_eq!(
            record.lookup("source_acknowledgement").as_deref(),
            Some("Data from the RAPID AMOC observing project.")
        );
        assert_eq!(
            record.lookup("doi").as_deref(),
            Some("https://doi.org/10.5285/aaa, https://doi.org/10.5285/bbb")
        );
        // free-form attributes take precedence
        assert_eq!(record.lookup("license").as_deref(), Some("CC0"));
        assert_eq!(record.lookup("summary"), None);
    }

    #[test]
    fn test_directory_merges_record_entries() {
        let record = MetadataRecord::from_yaml(RECORD, "test").unwrap();
        let directory = record.directory();
        assert_eq!(
            directory.lookup("RAPID", "Ben Moat"),
            Some("https://orcid.org/0000-0001-8676-7779")
        );
        assert_eq!(
            directory.lookup("Rapid", " Eleanor Frajka-Williams"),
            Some("https://orcid.org/0000-0001-8773-7838")
        );
        assert_eq!(directory.lookup("OSNAP", "Ben Moat"), None);
    }

    #[test]
    fn test_builtin_directory_knows_both_spellings() {
        let directory = ContributorDirectory::builtin();
        for name in ["Ben Moat", "Ben I. Moat"] {
            assert_eq!(
                directory.lookup("rapid", name),
                Some("https://orcid.org/0000-0001-8676-7779")
            );
        }
        assert_eq!(directory.lookup("RAPID", "B. Moat"), None);
    }

    #[test]
    fn test_record_parse_error_names_origin() {
        let err = MetadataRecord::from_yaml("contributors: {", "rapid.yaml").unwrap_err();
        assert!(err.to_string().contains("rapid.yaml"));
    }
}
