//! Data value checks: coordinate ranges, vertical sign convention and
//! `valid_min`/`valid_max`.

use ac1_common::bbox::{LATITUDE_RANGE, LONGITUDE_RANGE};
use ac1_common::{is_vertical, GeoBounds, Variable, LATITUDE, LONGITUDE};

use super::Checker;
use crate::report::Category;

pub(crate) fn check(c: &mut Checker<'_>) {
    let dataset = c.dataset;

    if let Some(values) = finite_values(dataset.coord(LATITUDE)) {
        if !values.iter().all(|&v| GeoBounds::latitude_in_range(v)) {
            c.error(
                Category::Variable,
                LATITUDE,
                format!("values outside [{}, {}]", LATITUDE_RANGE.0, LATITUDE_RANGE.1),
            );
        }
    }
    if let Some(values) = finite_values(dataset.coord(LONGITUDE)) {
        if !values.iter().all(|&v| GeoBounds::longitude_in_range(v)) {
            c.error(
                Category::Variable,
                LONGITUDE,
                format!("values outside [{}, {}]", LONGITUDE_RANGE.0, LONGITUDE_RANGE.1),
            );
        }
    }

    for (name, var) in dataset.coords().filter(|(name, _)| is_vertical(name)) {
        check_vertical_sign(c, name, var);
    }

    for (name, var, _) in dataset.variables() {
        check_valid_range(c, name, var);
    }
}

/// Depth and pressure grow downwards when `positive="down"`, so no value may
/// be negative; `positive="up"` is the mirror image.
fn check_vertical_sign(c: &mut Checker<'_>, name: &str, var: &Variable) {
    let Some(values) = finite_values(Some(var)) else {
        return;
    };
    match var.text_attr("positive") {
        Some("down") if values.iter().any(|&v| v < 0.0) => c.error(
            Category::Variable,
            name,
            "negative values with positive=\"down\"",
        ),
        Some("up") if values.iter().any(|&v| v > 0.0) => c.error(
            Category::Variable,
            name,
            "positive values with positive=\"up\"",
        ),
        _ => {}
    }
}

/// Values outside the variable's declared range, ignoring fill values.
fn check_valid_range(c: &mut Checker<'_>, name: &str, var: &Variable) {
    let spec = c.schema.variable(name);
    let bound = |key: &str| {
        var.attr(key)
            .and_then(|v| v.as_f64())
            .or_else(|| {
                let spec = spec?;
                if key == "valid_min" {
                    spec.valid_min
                } else {
                    spec.valid_max
                }
            })
    };
    let (min, max) = (bound("valid_min"), bound("valid_max"));
    if min.is_none() && max.is_none() {
        return;
    }
    let Some(values) = var.data().to_f64_vec() else {
        return;
    };
    let fill = var.attr("_FillValue").and_then(|v| v.as_f64());

    let outside = values
        .iter()
        .filter(|v| v.is_finite() && Some(**v) != fill)
        .filter(|&&v| min.is_some_and(|lo| v < lo) || max.is_some_and(|hi| v > hi))
        .count();
    if outside > 0 {
        c.warning(
            Category::Variable,
            name,
            format!(
                "{} value(s) outside valid range [{}, {}]",
                outside,
                min.map_or("-inf".to_string(), |v| v.to_string()),
                max.map_or("inf".to_string(), |v| v.to_string()),
            ),
        );
    }
}

/// Finite values of a numeric variable.
fn finite_values(var: Option<&Variable>) -> Option<Vec<f64>> {
    let mut values = var?.data().to_f64_vec()?;
    values.retain(|v| v.is_finite());
    Some(values)
}
