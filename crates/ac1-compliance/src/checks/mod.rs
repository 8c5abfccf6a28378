//! Individual rule groups. Each group inspects the dataset through a shared
//! [`Checker`] and appends findings; none of them stops the others.

pub(crate) mod attributes;
pub(crate) mod dimensions;
pub(crate) mod filename;
pub(crate) mod values;
pub(crate) mod variables;

use ac1_common::Dataset;
use ac1_schema::{Requirement, SchemaDefinition};

use crate::report::{Category, ComplianceReport, Severity};

/// Inputs of one validation run plus the report being filled.
pub(crate) struct Checker<'a> {
    pub dataset: &'a Dataset,
    pub schema: &'a SchemaDefinition,
    pub filename: &'a str,
    report: ComplianceReport,
}

impl<'a> Checker<'a> {
    pub fn new(dataset: &'a Dataset, schema: &'a SchemaDefinition, filename: &'a str) -> Self {
        let file_type = format!("{}/{}", schema.array, schema.product);
        Self {
            dataset,
            schema,
            filename,
            report: ComplianceReport::new(filename, Some(file_type)),
        }
    }

    pub fn error(&mut self, category: Category, entity: &str, message: impl Into<String>) {
        self.report.push(Severity::Error, category, entity, message);
    }

    pub fn warning(&mut self, category: Category, entity: &str, message: impl Into<String>) {
        self.report.push(Severity::Warning, category, entity, message);
    }

    /// Report at the severity a requirement level implies. Suggested items
    /// are not reported.
    pub fn flag(
        &mut self,
        requirement: Requirement,
        category: Category,
        entity: &str,
        message: impl Into<String>,
    ) {
        match requirement {
            Requirement::Mandatory => self.error(category, entity, message),
            Requirement::HighlyDesired => self.warning(category, entity, message),
            Requirement::Suggested => {}
        }
    }

    pub fn finish(self) -> ComplianceReport {
        self.report
    }
}
