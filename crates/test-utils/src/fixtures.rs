//! Metadata record fixtures.
//!
//! Records are YAML text so that every crate can parse them with its own
//! record type. Each one supplies every attribute the profile asks for,
//! including the highly-desired ones, so converted datasets carry no
//! warnings.

/// Complete metadata record for `array` (`RAPID`, `OSNAP`, `MOVE` or
/// `SAMBA`).
///
/// The RAPID record leaves the PI's ORCID out so that it is filled from the
/// contributor directory.
pub fn metadata_record_yaml(array: &str) -> String {
    let (contributor, orcid, institution, edmo, bounds) = match array {
        "RAPID" => (
            "Ben Moat",
            None,
            "National Oceanography Centre (Southampton) (UK)",
            "https://edmo.seadatanet.org/report/17",
            "{lat_min: 26.5, lat_max: 26.5, lon_min: -80.0, lon_max: -13.0}",
        ),
        "OSNAP" => (
            "Susan Lozier",
            Some("https://orcid.org/0000-0001-9212-8463"),
            "Georgia Institute of Technology",
            "https://ror.org/01zkghx44",
            "{lat_min: 52.0, lat_max: 60.5, lon_min: -56.0, lon_max: -5.0}",
        ),
        "MOVE" => (
            "Uwe Send",
            Some("https://orcid.org/0000-0002-8052-2443"),
            "Scripps Institution of Oceanography",
            "https://ror.org/04v7hvq31",
            "{lat_min: 16.0, lat_max: 16.0, lon_min: -60.5, lon_max: -51.5}",
        ),
        _ => (
            "Renellys Perez",
            Some("https://orcid.org/0000-0002-4401-3853"),
            "NOAA Atlantic Oceanographic and Meteorological Laboratory",
            "https://ror.org/042r9xb17",
            "{lat_min: -34.5, lat_max: -34.5, lon_min: -51.5, lon_max: 17.5}",
        ),
    };
    let orcid = orcid
        .map(|id| format!("\n    orcid: \"{}\"", id))
        .unwrap_or_default();

    format!(
        r#"array: {array}
contributors:
  - name: {contributor}
    email: data@{lower}.example.org
    role: Principal Investigator{orcid}
institutions:
  - name: {institution}
    vocabulary: "{edmo}"
    role: Owner
acknowledgement: Data from the {array} observing array, made freely available by its funders.
source_dois:
  - "https://doi.org/10.5285/{lower}-transports"
license: CC-BY 4.0
geospatial: {bounds}
attributes:
  title: {array} transport time series
  summary: Volume transport time series from the {array} array in AC1 format
  source: Moored instrument array
  institution: {institution}
  comment: Synthetic test record
"#,
        lower = array.to_ascii_lowercase(),
    )
}

/// A record without title and summary, for missing-metadata paths.
pub fn incomplete_record_yaml(array: &str) -> String {
    metadata_record_yaml(array)
        .lines()
        .filter(|line| !line.starts_with("  title:") && !line.starts_with("  summary:"))
        .collect::<Vec<_>>()
        .join("\n")
}
