//! Variable presence, datatype, dimensions, units and variable attributes.

use ac1_common::{AttrValue, Variable, TIME};
use ac1_schema::{Profile, Requirement, VariableSpec};

use super::Checker;
use crate::report::Category;

pub(crate) fn check(c: &mut Checker<'_>) {
    let (dataset, schema) = (c.dataset, c.schema);

    for spec in schema.coordinates.iter().chain(&schema.variables) {
        let Some(var) = dataset.variable(&spec.name) else {
            let message = match spec.requirement {
                Requirement::Mandatory => "mandatory variable is missing",
                _ => "highly desired variable is missing",
            };
            c.flag(spec.requirement, Category::Variable, &spec.name, message);
            continue;
        };
        check_layout(c, spec, var);
        check_attributes(c, spec, var);
    }

    for (name, var, _) in dataset.variables() {
        check_units(c, name, var, schema.variable(name));
    }
}

fn check_layout(c: &mut Checker<'_>, spec: &VariableSpec, var: &Variable) {
    if var.dtype() != spec.dtype {
        c.error(
            Category::Variable,
            &spec.name,
            format!("datatype is {}, schema requires {}", var.dtype(), spec.dtype),
        );
    }
    if var.dims() != spec.dims.as_slice() {
        c.error(
            Category::Variable,
            &spec.name,
            format!("dimensions {:?}, schema requires {:?}", var.dims(), spec.dims),
        );
    }
}

/// Attributes a present variable must carry. Gaps are errors on mandatory
/// variables and warnings on the rest.
fn check_attributes(c: &mut Checker<'_>, spec: &VariableSpec, var: &Variable) {
    let level = if spec.is_mandatory() {
        Requirement::Mandatory
    } else {
        Requirement::HighlyDesired
    };
    let name = spec.name.as_str();

    if text(var, "long_name").is_none() {
        c.flag(level, Category::Attribute, name, "missing long_name");
    }

    let expected = [
        ("standard_name", &spec.standard_name),
        ("axis", &spec.axis),
        ("positive", &spec.positive),
    ];
    for (key, declared) in expected {
        let Some(declared) = declared else {
            continue;
        };
        match text(var, key) {
            None => c.flag(level, Category::Attribute, name, format!("missing {}", key)),
            Some(found) if found != declared.as_str() => c.flag(
                level,
                Category::Attribute,
                name,
                format!("{} is '{}', expected '{}'", key, found, declared),
            ),
            Some(_) => {}
        }
    }

    if let Some(vocabulary) = &spec.vocabulary {
        match text(var, "vocabulary") {
            None => c.flag(level, Category::Vocabulary, name, "missing vocabulary URL"),
            Some(found) if found != vocabulary.as_str() => c.flag(
                level,
                Category::Vocabulary,
                name,
                format!("vocabulary is '{}', expected '{}'", found, vocabulary),
            ),
            Some(_) => {}
        }
    }

    if spec.fill_value.is_some() {
        match var.attr("_FillValue") {
            None => c.flag(level, Category::Attribute, name, "missing _FillValue"),
            Some(fill) if fill.dtype() != spec.dtype => c.flag(
                level,
                Category::Attribute,
                name,
                format!("_FillValue is {}, variable is {}", fill.dtype(), spec.dtype),
            ),
            Some(_) => {}
        }
    }
}

/// Units must be approved and match the schema; TIME uses a CF time
/// encoding instead.
fn check_units(c: &mut Checker<'_>, name: &str, var: &Variable, spec: Option<&VariableSpec>) {
    let declared = spec.and_then(|s| s.units.as_deref());
    let Some(units) = text(var, "units") else {
        if let (Some(spec), Some(_)) = (spec, declared) {
            let level = if spec.is_mandatory() {
                Requirement::Mandatory
            } else {
                Requirement::HighlyDesired
            };
            c.flag(level, Category::Units, name, "missing units");
        }
        return;
    };

    if name == TIME {
        match declared {
            _ if !Profile::is_time_units(units) => c.error(
                Category::Units,
                name,
                format!("'{}' does not follow '<unit> since <reference>'", units),
            ),
            Some(declared) if declared != units => c.error(
                Category::Units,
                name,
                format!("units '{}' differ from '{}'", units, declared),
            ),
            _ => {}
        }
        return;
    }

    let approved = c.schema.profile.is_approved_unit(units);
    match declared {
        Some(declared) if declared != units => c.error(
            Category::Units,
            name,
            format!("units '{}' differ from '{}'", units, declared),
        ),
        _ if !approved => c.error(
            Category::Units,
            name,
            format!("units '{}' are not in the approved set", units),
        ),
        _ => {}
    }
}

fn text<'v>(var: &'v Variable, key: &str) -> Option<&'v str> {
    var.attr(key)
        .and_then(AttrValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
