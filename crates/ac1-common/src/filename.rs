//! OceanSITES filename codec.
//!
//! AC1 files are named
//! `OS_<SITE>_<YYYYMMDD>-<YYYYMMDD>_<CONTENT>_<PRODUCT_RESOLUTION>.nc`, e.g.
//! `OS_RAPID_20040401-20230211_DPR_transports_T12H.nc`. The trailing tag may
//! itself contain underscores (`transports_T12H`, `gridded_mooring`).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FilenameError;

const PREFIX: &str = "OS";
const EXTENSION: &str = ".nc";
const DATE_FORMAT: &str = "%Y%m%d";

/// OceanSITES content type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// Long time series
    #[serde(rename = "LTS")]
    Lts,
    /// Gridded data
    #[serde(rename = "GRD")]
    Grd,
    /// Derived product
    #[serde(rename = "DPR")]
    Dpr,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Lts => "LTS",
            ContentType::Grd => "GRD",
            ContentType::Dpr => "DPR",
        }
    }

    pub fn all() -> &'static [ContentType] {
        &[ContentType::Lts, ContentType::Grd, ContentType::Dpr]
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = FilenameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| FilenameError::UnknownContentType(s.to_string()))
    }
}

/// Decoded components of an OceanSITES filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OceanSitesFilename {
    pub site_code: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub content_type: ContentType,
    /// Product and resolution part, e.g. `transports_T12H`
    pub resolution_tag: String,
}

impl OceanSitesFilename {
    /// Validate components and assemble a filename value.
    pub fn new(
        site_code: &str,
        start: NaiveDate,
        end: NaiveDate,
        content_type: ContentType,
        resolution_tag: &str,
    ) -> Result<Self, FilenameError> {
        validate_site_code(site_code)?;
        validate_tag(resolution_tag)?;
        Ok(Self {
            site_code: site_code.to_string(),
            start,
            end,
            content_type,
            resolution_tag: resolution_tag.to_string(),
        })
    }

    /// Filename without the `.nc` extension; also used as the dataset `id`.
    pub fn stem(&self) -> String {
        format!(
            "{}_{}_{}-{}_{}_{}",
            PREFIX,
            self.site_code,
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT),
            self.content_type,
            self.resolution_tag
        )
    }
}

impl fmt::Display for OceanSitesFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem(), EXTENSION)
    }
}

impl FromStr for OceanSitesFilename {
    type Err = FilenameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_filename(s)
    }
}

fn validate_site_code(site: &str) -> Result<(), FilenameError> {
    let ok = !site.is_empty()
        && site
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(FilenameError::InvalidSiteCode(site.to_string()))
    }
}

fn validate_tag(tag: &str) -> Result<(), FilenameError> {
    let ok = !tag.is_empty()
        && tag
            .split('_')
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_alphanumeric()));
    if ok {
        Ok(())
    } else {
        Err(FilenameError::InvalidTag(tag.to_string()))
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, FilenameError> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FilenameError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| FilenameError::InvalidDate(s.to_string()))
}

/// Build an OceanSITES filename from its components.
pub fn build_filename(
    site_code: &str,
    start: NaiveDate,
    end: NaiveDate,
    content_type: ContentType,
    resolution_tag: &str,
) -> Result<String, FilenameError> {
    OceanSitesFilename::new(site_code, start, end, content_type, resolution_tag).map(|f| f.to_string())
}

/// Decode an OceanSITES filename. Directory components are ignored.
///
/// The start/end ordering is not checked here; the compliance checker
/// reports it so that a misordered name still yields a full report.
pub fn parse_filename(name: &str) -> Result<OceanSitesFilename, FilenameError> {
    let name = Path::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let stem = name
        .strip_suffix(EXTENSION)
        .ok_or_else(|| FilenameError::MissingExtension(name.to_string()))?;

    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 5 {
        return Err(FilenameError::ComponentCount {
            name: name.to_string(),
            found: parts.len(),
        });
    }
    if parts[0] != PREFIX {
        return Err(FilenameError::WrongPrefix(name.to_string()));
    }

    let site_code = parts[1];
    validate_site_code(site_code)?;

    let (start, end) = parts[2]
        .split_once('-')
        .ok_or_else(|| FilenameError::InvalidDateRange(parts[2].to_string()))?;
    let start = parse_date(start)?;
    let end = parse_date(end)?;

    let content_type: ContentType = parts[3].parse()?;

    let resolution_tag = parts[4..].join("_");
    validate_tag(&resolution_tag)?;

    Ok(OceanSitesFilename {
        site_code: site_code.to_string(),
        start,
        end,
        content_type,
        resolution_tag,
    })
}
