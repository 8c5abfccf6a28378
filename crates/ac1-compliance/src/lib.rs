//! AC1 compliance checker.
//!
//! [`validate`] inspects a candidate dataset against its schema and returns a
//! [`ComplianceReport`] listing every violation, grouped by severity:
//!
//! - filename against the product template and the TIME span
//! - dimension table and canonical axis order
//! - variables, datatypes, units and variable attributes
//! - global attributes and their value rules
//! - coordinate and data value ranges

mod checker;
mod checks;
pub mod report;

pub use checker::{validate, validate_detected};
pub use report::{Category, ComplianceReport, Finding, Severity};
