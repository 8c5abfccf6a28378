//! Global attributes: presence, value rules, feature type, geographic
//! bounds and prohibited names.

use ac1_common::{is_vertical, GeoBounds};
use ac1_schema::Requirement;

use super::Checker;
use crate::report::Category;

pub(crate) fn check(c: &mut Checker<'_>) {
    let (dataset, schema) = (c.dataset, c.schema);

    for spec in &schema.global_attributes {
        let Some(value) = dataset.attr(&spec.name).filter(|v| !v.is_empty()) else {
            let message = match spec.requirement {
                Requirement::Mandatory => "mandatory global attribute is missing",
                _ => "highly desired global attribute is missing",
            };
            c.flag(spec.requirement, Category::Attribute, &spec.name, message);
            continue;
        };
        if let Some(Err(reason)) = spec.effective_rule().map(|rule| rule.check(value)) {
            if spec.requirement == Requirement::Mandatory {
                c.error(Category::Attribute, &spec.name, reason);
            } else {
                c.warning(Category::Attribute, &spec.name, reason);
            }
        }
    }

    check_feature_type(c);
    check_bounds(c);

    for name in dataset.attrs.keys() {
        if schema.profile.is_prohibited(name) {
            c.warning(
                Category::Attribute,
                name,
                "prohibited attribute, use the contributor_* attributes instead",
            );
        }
    }
}

/// `featureType` must agree with the presence of a vertical dimension.
fn check_feature_type(c: &mut Checker<'_>) {
    let dataset = c.dataset;
    let Some(found) = dataset.text_attr("featureType") else {
        return;
    };
    let expected = if dataset.dimensions().iter().any(|d| is_vertical(&d.name)) {
        "timeSeriesProfile"
    } else {
        "timeSeries"
    };
    if found.trim() != expected {
        c.error(
            Category::Attribute,
            "featureType",
            format!("'{}' does not fit the dimensions, expected '{}'", found, expected),
        );
    }
}

fn check_bounds(c: &mut Checker<'_>) {
    let dataset = c.dataset;
    let bounds: [(&str, fn(f64) -> bool); 4] = [
        ("geospatial_lat_min", GeoBounds::latitude_in_range),
        ("geospatial_lat_max", GeoBounds::latitude_in_range),
        ("geospatial_lon_min", GeoBounds::longitude_in_range),
        ("geospatial_lon_max", GeoBounds::longitude_in_range),
    ];
    for (name, in_range) in bounds {
        let Some(value) = dataset.attr(name) else {
            continue;
        };
        match value.as_f64() {
            Some(v) if in_range(v) => {}
            Some(v) => c.error(Category::Attribute, name, format!("{} is out of range", v)),
            None => c.error(Category::Attribute, name, format!("'{}' is not a number", value)),
        }
    }
}
