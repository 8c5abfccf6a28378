//! Compliance checker entry points.

use ac1_common::Dataset;
use ac1_schema::{SchemaDefinition, SchemaRegistry};
use tracing::{debug, info};

use crate::checks::{self, Checker};
use crate::report::{Category, ComplianceReport, Severity};

/// Validate `dataset` against `schema` as if stored under `filename`.
///
/// Never fails: every rule group runs and all findings are collected, so a
/// single run lists every violation.
pub fn validate(dataset: &Dataset, schema: &SchemaDefinition, filename: &str) -> ComplianceReport {
    let mut checker = Checker::new(dataset, schema, filename);

    checks::filename::check(&mut checker);
    checks::dimensions::check(&mut checker);
    checks::variables::check(&mut checker);
    checks::attributes::check(&mut checker);
    checks::values::check(&mut checker);

    let report = checker.finish();
    info!(
        filename,
        array = %schema.array,
        product = %schema.product,
        passed = report.passed(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "Validated dataset"
    );
    report
}

/// Validate against the schema whose filename template matches `filename`.
/// An unmatched filename yields a report with a single filename error.
pub fn validate_detected(
    dataset: &Dataset,
    registry: &SchemaRegistry,
    filename: &str,
) -> ComplianceReport {
    match registry.detect_product(filename) {
        Some(schema) => {
            debug!(filename, array = %schema.array, product = %schema.product, "Detected product");
            validate(dataset, schema, filename)
        }
        None => {
            let mut report = ComplianceReport::new(filename, None);
            report.push(
                Severity::Error,
                Category::Filename,
                filename,
                "filename does not match any registered product",
            );
            report
        }
    }
}
