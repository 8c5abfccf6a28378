//! Subcommand implementations.
//!
//! Each command takes plain arguments and returns its result, leaving
//! printing and exit codes to `main`.

use std::fs;
use std::path::{Path, PathBuf};

use ac1_common::{build_filename, parse_filename, ContentType, Dataset};
use ac1_compliance::{validate, validate_detected, ComplianceReport};
use ac1_convert::{to_ac1, MetadataRecord};
use ac1_schema::SchemaRegistry;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::info;

/// Registry from `dir`, or the built-in schemas.
pub fn load_registry(dir: Option<&Path>) -> Result<SchemaRegistry> {
    let registry = match dir {
        Some(dir) => SchemaRegistry::from_dir(dir)
            .with_context(|| format!("Failed to load schemas from {}", dir.display()))?,
        None => SchemaRegistry::builtin().context("Failed to load built-in schemas")?,
    };
    info!(schemas = registry.len(), "Loaded schema registry");
    Ok(registry)
}

pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
    Dataset::from_json(&content).with_context(|| format!("Invalid dataset document: {}", path.display()))
}

// ============================================================================
// convert
// ============================================================================

#[derive(Debug, Clone)]
pub struct ConvertArgs {
    pub array: String,
    pub product: String,
    pub input: PathBuf,
    pub metadata: PathBuf,
    pub output_dir: PathBuf,
    pub check: bool,
}

#[derive(Debug)]
pub struct ConvertOutcome {
    /// Written dataset document, `<id>.json`
    pub path: PathBuf,
    pub filename: String,
    /// Present when the output was validated
    pub report: Option<ComplianceReport>,
}

pub fn convert(registry: &SchemaRegistry, args: &ConvertArgs) -> Result<ConvertOutcome> {
    let native = read_dataset(&args.input)?;
    let record = MetadataRecord::from_file(&args.metadata)?;
    let conversion = to_ac1(&native, registry, &args.array, &args.product, &record)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    let report = if args.check {
        let schema = registry.get_schema(&args.array, &args.product)?;
        let report = validate(&conversion.dataset, schema, &conversion.filename);
        if !report.passed() {
            bail!(
                "Converted dataset is not compliant ({} errors):\n{}",
                report.error_count(),
                report
            );
        }
        Some(report)
    } else {
        None
    };

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;
    let stem = conversion
        .filename
        .strip_suffix(".nc")
        .unwrap_or(&conversion.filename);
    let path = args.output_dir.join(format!("{}.json", stem));
    let json = conversion.dataset.to_json_pretty()?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), filename = %conversion.filename, "Wrote AC1 dataset");

    Ok(ConvertOutcome {
        path,
        filename: conversion.filename,
        report,
    })
}

// ============================================================================
// validate
// ============================================================================

#[derive(Debug, Clone)]
pub struct ValidateArgs {
    pub input: PathBuf,
    pub filename: String,
    /// Array and product; detected from the filename when unset
    pub product: Option<(String, String)>,
}

pub fn validate_file(registry: &SchemaRegistry, args: &ValidateArgs) -> Result<ComplianceReport> {
    let dataset = read_dataset(&args.input)?;
    let report = match &args.product {
        Some((array, product)) => {
            let schema = registry.get_schema(array, product)?;
            validate(&dataset, schema, &args.filename)
        }
        None => validate_detected(&dataset, registry, &args.filename),
    };
    Ok(report)
}

// ============================================================================
// schemas / filename
// ============================================================================

/// One line per registered product: `ARRAY/product  pattern  description`.
pub fn list_schemas(registry: &SchemaRegistry) -> Vec<String> {
    registry
        .schemas()
        .map(|s| {
            format!(
                "{}/{}\t{}\t{}",
                s.array,
                s.product,
                s.filename_pattern(),
                s.description.as_deref().unwrap_or("")
            )
        })
        .collect()
}

/// Decoded filename as pretty JSON.
pub fn parse_name(name: &str) -> Result<String> {
    let parsed = parse_filename(name).with_context(|| format!("Cannot decode '{}'", name))?;
    Ok(serde_json::to_string_pretty(&parsed)?)
}

pub fn build_name(
    site_code: &str,
    start: &str,
    end: &str,
    content_type: &str,
    tag: &str,
) -> Result<String> {
    let content_type: ContentType = content_type.parse()?;
    Ok(build_filename(
        site_code,
        parse_date(start)?,
        parse_date(end)?,
        content_type,
        tag,
    )?)
}

/// `YYYYMMDD` or `YYYY-MM-DD`.
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .with_context(|| format!("Invalid date '{}', expected YYYYMMDD or YYYY-MM-DD", s))
}
