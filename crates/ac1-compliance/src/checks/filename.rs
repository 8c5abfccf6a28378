//! Filename against the product template and the data's time span.

use ac1_common::{parse_filename, OceanSitesFilename, TimeUnits, TIME};
use chrono::{Duration, NaiveTime};

use super::Checker;
use crate::report::Category;

pub(crate) fn check(c: &mut Checker<'_>) {
    let name = c.filename;
    let parsed = match parse_filename(name) {
        Ok(parsed) => parsed,
        Err(e) => {
            c.error(Category::Filename, name, format!("invalid OceanSITES filename: {}", e));
            return;
        }
    };

    check_template(c, name, &parsed);

    if parsed.start > parsed.end {
        c.error(
            Category::Filename,
            name,
            format!("start date {} is after end date {}", parsed.start, parsed.end),
        );
    } else {
        check_time_span(c, &parsed);
    }

    let stem = parsed.stem();
    let dataset = c.dataset;
    if let Some(id) = dataset.text_attr("id") {
        if id.trim() != stem {
            c.warning(
                Category::Filename,
                "id",
                format!("id '{}' does not match filename stem '{}'", id, stem),
            );
        }
    }
}

fn check_template(c: &mut Checker<'_>, name: &str, parsed: &OceanSitesFilename) {
    let schema = c.schema;
    if parsed.site_code != schema.site_code {
        c.error(
            Category::Filename,
            name,
            format!(
                "site code '{}' does not match '{}' ({})",
                parsed.site_code,
                schema.site_code,
                schema.filename_pattern()
            ),
        );
    }
    if parsed.content_type != schema.template.content_type {
        c.error(
            Category::Filename,
            name,
            format!(
                "content type '{}' does not match '{}'",
                parsed.content_type, schema.template.content_type
            ),
        );
    }
    if parsed.resolution_tag != schema.template.tag {
        c.error(
            Category::Filename,
            name,
            format!(
                "product tag '{}' does not match '{}'",
                parsed.resolution_tag, schema.template.tag
            ),
        );
    }
}

/// TIME values must fall in `[start, end + 1 day)`.
fn check_time_span(c: &mut Checker<'_>, parsed: &OceanSitesFilename) {
    let dataset = c.dataset;
    let Some(time) = dataset.coord(TIME) else {
        return;
    };
    let Some((lo, hi)) = time.data().finite_extrema() else {
        return;
    };
    // Unparseable units are reported by the units checks
    let units = match time.text_attr("units") {
        Some(units) => match TimeUnits::parse(units) {
            Ok(units) => units,
            Err(_) => return,
        },
        None => TimeUnits::ac1(),
    };

    let start = parsed.start.and_time(NaiveTime::MIN).and_utc().timestamp() as f64;
    let end = (parsed.end + Duration::days(1))
        .and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp() as f64;
    let (first, last) = (units.to_epoch_seconds(lo), units.to_epoch_seconds(hi));

    if first < start || last >= end {
        c.error(
            Category::Filename,
            TIME,
            format!(
                "TIME values fall outside the filename date range {} to {}",
                parsed.start, parsed.end
            ),
        );
    }
}
