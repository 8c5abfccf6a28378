//! Compliance checks over converted datasets and deliberately broken copies.

use ac1_common::{ArrayData, AttrValue, Dataset, Variable, LATITUDE, TIME};
use ac1_compliance::{validate, validate_detected, Category, ComplianceReport, Severity};
use ac1_convert::{to_ac1_at, Conversion, MetadataRecord};
use ac1_schema::{SchemaDefinition, SchemaRegistry};
use chrono::{DateTime, TimeZone, Utc};
use test_utils::{
    assert_approx_eq, metadata_record_yaml, move_transports, osnap_transports,
    rapid_gridded_sections, rapid_moc_transports, rapid_moc_vertical, rapid_mocha_mht,
    samba_transports, velocity_cm_s, RAPID_DEPTHS, RAPID_SIGMA_LEVELS,
};

const RAPID_TRANSPORTS: &str = "OS_RAPID_20040402-20040403_DPR_transports_T12H.nc";

fn registry() -> SchemaRegistry {
    SchemaRegistry::builtin().unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
}

fn convert(native: &Dataset, array: &str, product: &str) -> Conversion {
    let record = MetadataRecord::from_yaml(&metadata_record_yaml(array), "fixture").unwrap();
    to_ac1_at(native, &registry(), array, product, &record, now()).unwrap()
}

fn schema<'r>(registry: &'r SchemaRegistry, array: &str, product: &str) -> &'r SchemaDefinition {
    registry.get_schema(array, product).unwrap()
}

/// Converted RAPID component transports with four time steps.
fn rapid() -> Dataset {
    let out = convert(&rapid_moc_transports(4), "RAPID", "component_transports");
    assert_eq!(out.filename, RAPID_TRANSPORTS);
    out.dataset
}

fn check_rapid(ds: &Dataset, filename: &str) -> ComplianceReport {
    let registry = registry();
    validate(ds, schema(&registry, "RAPID", "component_transports"), filename)
}

fn entities(report: &ComplianceReport, severity: Severity, category: Category) -> Vec<String> {
    report
        .matching(severity, category)
        .into_iter()
        .map(|f| f.entity.clone())
        .collect()
}

fn assert_clean(report: &ComplianceReport) {
    assert!(report.passed(), "{}", report);
    assert_eq!(report.warning_count(), 0, "{}", report);
}

// ============================================================================
// Converted datasets are compliant
// ============================================================================

#[test]
fn test_converted_rapid_transports_pass() {
    assert_clean(&check_rapid(&rapid(), RAPID_TRANSPORTS));
}

#[test]
fn test_converted_rapid_streamfunction_passes() {
    let registry = registry();
    let out = convert(&rapid_moc_vertical(3, RAPID_DEPTHS), "RAPID", "streamfunction");
    let report = validate(
        &out.dataset,
        schema(&registry, "RAPID", "streamfunction"),
        &out.filename,
    );
    assert_clean(&report);
}

#[test]
fn test_converted_osnap_move_samba_pass() {
    let registry = registry();
    let cases = [
        (osnap_transports(3, true), "OSNAP"),
        (move_transports(4), "MOVE"),
        (samba_transports(2), "SAMBA"),
    ];
    for (native, array) in cases {
        let out = convert(&native, array, "transports");
        let report = validate(&out.dataset, schema(&registry, array, "transports"), &out.filename);
        assert_clean(&report);
    }
}

#[test]
fn test_converted_rapid_meridional_transports_pass() {
    let registry = registry();
    let out = convert(&rapid_mocha_mht(2), "RAPID", "meridional_transports");
    assert_eq!(out.filename, "OS_RAPID_20040402-20040412_DPR_transports_T10D.nc");

    let ds = &out.dataset;
    assert_eq!(ds.dimension("SIGMA0").unwrap().size, RAPID_SIGMA_LEVELS);
    let sigma = ds.data_var("STREAMFUNCTION_SIGMA").unwrap();
    assert_eq!(sigma.dims(), &[TIME.to_string(), "SIGMA0".to_string()]);
    assert_eq!(sigma.shape(), &[2, RAPID_SIGMA_LEVELS]);

    let report = validate(ds, schema(&registry, "RAPID", "meridional_transports"), &out.filename);
    assert_clean(&report);

    // the same dataset breaks the depth-only streamfunction product
    let report = validate(ds, schema(&registry, "RAPID", "streamfunction"), &out.filename);
    assert!(entities(&report, Severity::Error, Category::Dimension).contains(&"SIGMA0".to_string()));
}

#[test]
fn test_converted_rapid_gridded_sections_pass() {
    let registry = registry();
    let out = convert(&rapid_gridded_sections(2, 4), "RAPID", "gridded_sections");
    assert_eq!(out.filename, "OS_RAPID_20040402-20040412_GRD_sections_T10D.nc");

    let velocity = out.dataset.data_var("VELOCITY").unwrap();
    assert_eq!(
        velocity.dims(),
        &[TIME.to_string(), "DEPTH".to_string(), "LONGITUDE".to_string()]
    );
    assert_eq!(velocity.shape(), &[2, RAPID_DEPTHS, 4]);
    // (time 1, depth 3, lon 2), native cm/s
    let values = velocity.data().to_f64_vec().unwrap();
    assert_approx_eq!(values[RAPID_DEPTHS * 4 + 3 * 4 + 2], velocity_cm_s(1, 3, 2) * 0.01, 1e-6);

    let report = validate(&out.dataset, schema(&registry, "RAPID", "gridded_sections"), &out.filename);
    assert_clean(&report);
    let detected = validate_detected(&out.dataset, &registry, &out.filename);
    assert_eq!(detected.file_type(), Some("RAPID/gridded_sections"));
    assert!(detected.passed(), "{}", detected);
}

#[test]
fn test_missing_highly_desired_variable_warns() {
    let registry = registry();
    let out = convert(&osnap_transports(3, false), "OSNAP", "transports");
    let report = validate(&out.dataset, schema(&registry, "OSNAP", "transports"), &out.filename);

    assert!(report.passed());
    assert_eq!(report.warning_count(), 1);
    assert_eq!(
        entities(&report, Severity::Warning, Category::Variable),
        vec!["FRESHWATER_TRANSPORT"]
    );
}

// ============================================================================
// Dimensions
// ============================================================================

#[test]
fn test_dataset_without_time_fails() {
    let mut ds = Dataset::new();
    ds.attrs = rapid().attrs;
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    assert!(!report.passed());
    assert!(entities(&report, Severity::Error, Category::Dimension).contains(&TIME.to_string()));
}

/// The streamfunction product rebuilt with 250 depth levels instead of 307.
fn truncated_streamfunction(out: &Conversion, levels: usize) -> Dataset {
    let src = &out.dataset;
    let steps = src.dimension(TIME).unwrap().size;

    let mut ds = Dataset::new();
    ds.add_unlimited_dimension(TIME, steps).unwrap();
    ds.add_dimension("DEPTH", levels).unwrap();
    ds.add_coord(TIME, src.coord(TIME).unwrap().clone()).unwrap();
    ds.add_coord(LATITUDE, src.coord(LATITUDE).unwrap().clone()).unwrap();

    let depth = src.coord("DEPTH").unwrap();
    let depths = depth.data().to_f64_vec().unwrap();
    let mut truncated = Variable::vector("DEPTH", ArrayData::Double(depths[..levels].to_vec()));
    truncated.attrs = depth.attrs.clone();
    ds.add_coord("DEPTH", truncated).unwrap();

    let sf = src.data_var("STREAMFUNCTION").unwrap();
    let values = sf.data().to_f64_vec().unwrap();
    let rows: Vec<f64> = values
        .chunks(RAPID_DEPTHS)
        .flat_map(|row| row[..levels].to_vec())
        .collect();
    let mut rebuilt = Variable::new(
        "STREAMFUNCTION",
        vec![TIME.to_string(), "DEPTH".to_string()],
        vec![steps, levels],
        ArrayData::Double(rows),
    )
    .unwrap();
    rebuilt.attrs = sf.attrs.clone();
    ds.add_data_var("STREAMFUNCTION", rebuilt).unwrap();

    ds.attrs = src.attrs.clone();
    ds
}

#[test]
fn test_wrong_depth_size_is_single_dimension_error() {
    let registry = registry();
    let out = convert(&rapid_moc_vertical(2, RAPID_DEPTHS), "RAPID", "streamfunction");
    let ds = truncated_streamfunction(&out, 250);
    let report = validate(&ds, schema(&registry, "RAPID", "streamfunction"), &out.filename);

    assert_eq!(report.error_count(), 1, "{}", report);
    assert_eq!(entities(&report, Severity::Error, Category::Dimension), vec!["DEPTH"]);
    let finding = report.errors().next().unwrap();
    assert!(finding.message.contains("250"));
    assert!(finding.message.contains("307"));
}

#[test]
fn test_forbidden_dimension() {
    let registry = registry();
    let out = convert(&rapid_moc_vertical(2, RAPID_DEPTHS), "RAPID", "streamfunction");
    let mut ds = out.dataset.clone();
    ds.add_dimension("SIGMA0", 4).unwrap();

    let report = validate(&ds, schema(&registry, "RAPID", "streamfunction"), &out.filename);
    assert_eq!(entities(&report, Severity::Error, Category::Dimension), vec!["SIGMA0"]);
}

#[test]
fn test_non_canonical_variable_order() {
    let mut ds = rapid();
    let transport = ds.remove_variable("TRANSPORT").unwrap();
    let mut swapped = transport.permuted("TRANSPORT", &[1, 0]).unwrap();
    swapped.attrs = transport.attrs.clone();
    ds.add_data_var("TRANSPORT", swapped).unwrap();

    let report = check_rapid(&ds, RAPID_TRANSPORTS);
    assert!(entities(&report, Severity::Error, Category::Dimension).contains(&"TRANSPORT".to_string()));
    assert!(entities(&report, Severity::Error, Category::Variable).contains(&"TRANSPORT".to_string()));
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn test_prohibited_attribute_only_warns() {
    let mut ds = rapid();
    ds.set_attr("creator_name", "Someone");
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    assert!(report.passed());
    assert_eq!(report.error_count(), 0);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(
        entities(&report, Severity::Warning, Category::Attribute),
        vec!["creator_name"]
    );
}

#[test]
fn test_principal_investigator_attribute_only_warns() {
    let mut ds = rapid();
    ds.set_attr("principal_investigator_email", "pi@example.org");
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    assert!(report.passed());
    assert_eq!(report.warning_count(), 1);
    assert_eq!(
        entities(&report, Severity::Warning, Category::Attribute),
        vec!["principal_investigator_email"]
    );
}

#[test]
fn test_value_rules() {
    let mut ds = rapid();
    ds.set_attr("data_mode", "X");
    ds.set_attr("Conventions", "CF-1.8");
    ds.set_attr("contributor_id", "0000-0001-8676-7779");
    ds.set_attr("date_created", "2024-05-01");
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    let mut flagged = entities(&report, Severity::Error, Category::Attribute);
    flagged.sort();
    assert_eq!(flagged, vec!["Conventions", "contributor_id", "data_mode", "date_created"]);
}

#[test]
fn test_missing_global_attributes() {
    let mut ds = rapid();
    ds.attrs.remove("title");
    ds.set_attr("summary", "  ");
    ds.attrs.remove("license");
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    let mut errors = entities(&report, Severity::Error, Category::Attribute);
    errors.sort();
    assert_eq!(errors, vec!["summary", "title"]);
    assert_eq!(entities(&report, Severity::Warning, Category::Attribute), vec!["license"]);
}

#[test]
fn test_feature_type_must_fit_dimensions() {
    let mut ds = rapid();
    ds.set_attr("featureType", "timeSeriesProfile");
    let report = check_rapid(&ds, RAPID_TRANSPORTS);
    assert_eq!(entities(&report, Severity::Error, Category::Attribute), vec!["featureType"]);
}

#[test]
fn test_geospatial_bounds_in_range() {
    let mut ds = rapid();
    ds.set_attr("geospatial_lat_max", 120.0);
    ds.set_attr("geospatial_lon_min", "west");
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    let mut errors = entities(&report, Severity::Error, Category::Attribute);
    errors.sort();
    assert_eq!(errors, vec!["geospatial_lat_max", "geospatial_lon_min"]);
}

#[test]
fn test_variable_attributes_and_vocabulary() {
    let mut ds = rapid();
    let attrs = ds.variable_attrs_mut("MOC_TRANSPORT").unwrap();
    attrs.remove("long_name");
    attrs.remove("vocabulary");
    attrs.insert("_FillValue".to_string(), AttrValue::Int(-999));
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    assert_eq!(
        entities(&report, Severity::Error, Category::Attribute),
        vec!["MOC_TRANSPORT", "MOC_TRANSPORT"]
    );
    assert_eq!(
        entities(&report, Severity::Error, Category::Vocabulary),
        vec!["MOC_TRANSPORT"]
    );
}

#[test]
fn test_units_must_be_approved_and_declared() {
    let mut ds = rapid();
    ds.variable_attrs_mut("MOC_TRANSPORT")
        .unwrap()
        .insert("units".to_string(), "Sv".into());
    ds.variable_attrs_mut(TIME)
        .unwrap()
        .insert("units".to_string(), "seconds".into());
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    let mut errors = entities(&report, Severity::Error, Category::Units);
    errors.sort();
    assert_eq!(errors, vec!["MOC_TRANSPORT", "TIME"]);
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_out_of_valid_range_warns() {
    let mut ds = rapid();
    ds.variable_attrs_mut("MOC_TRANSPORT")
        .unwrap()
        .insert("valid_max".to_string(), AttrValue::Double(17.15));
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    assert!(report.passed());
    let warnings = report.matching(Severity::Warning, Category::Variable);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].entity, "MOC_TRANSPORT");
    // 17.2 and 17.3 exceed the range
    assert!(warnings[0].message.starts_with("2 value(s)"));
}

#[test]
fn test_latitude_out_of_range() {
    let mut ds = rapid();
    let lat = ds.remove_variable(LATITUDE).unwrap();
    let mut moved = Variable::new(LATITUDE, Vec::new(), Vec::new(), ArrayData::Double(vec![95.0]))
        .unwrap();
    moved.attrs = lat.attrs;
    ds.add_coord(LATITUDE, moved).unwrap();
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    assert_eq!(entities(&report, Severity::Error, Category::Variable), vec![LATITUDE]);
    assert_eq!(entities(&report, Severity::Warning, Category::Variable), vec![LATITUDE]);
}

#[test]
fn test_negative_depth_with_positive_down() {
    let registry = registry();
    let out = convert(&rapid_moc_vertical(2, RAPID_DEPTHS), "RAPID", "streamfunction");
    let mut ds = out.dataset.clone();
    let depth = ds.remove_variable("DEPTH").unwrap();
    let negated = depth.data().to_f64_vec().unwrap().iter().map(|v| -v).collect();
    let flipped = ArrayData::Double(negated).cast(depth.dtype()).unwrap();
    let mut flipped = Variable::vector("DEPTH", flipped);
    flipped.attrs = depth.attrs;
    ds.add_coord("DEPTH", flipped).unwrap();

    let report = validate(&ds, schema(&registry, "RAPID", "streamfunction"), &out.filename);
    assert_eq!(entities(&report, Severity::Error, Category::Variable), vec!["DEPTH"]);
}

// ============================================================================
// Filename
// ============================================================================

#[test]
fn test_malformed_filename() {
    let report = check_rapid(&rapid(), "rapid_transports.nc");
    assert!(!report.passed());
    assert_eq!(
        entities(&report, Severity::Error, Category::Filename),
        vec!["rapid_transports.nc"]
    );
}

#[test]
fn test_filename_template_mismatch() {
    let name = "OS_RAPID_20040402-20040403_DPR_streamfunction_T12H.nc";
    let report = check_rapid(&rapid(), name);

    let errors = report.matching(Severity::Error, Category::Filename);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("streamfunction_T12H"));
    // id still names the real product
    assert_eq!(entities(&report, Severity::Warning, Category::Filename), vec!["id"]);
}

#[test]
fn test_time_outside_filename_range() {
    let report = check_rapid(&rapid(), "OS_RAPID_20040402-20040402_DPR_transports_T12H.nc");
    assert!(entities(&report, Severity::Error, Category::Filename).contains(&TIME.to_string()));
}

#[test]
fn test_reversed_date_range() {
    let name = "OS_RAPID_20040403-20040402_DPR_transports_T12H.nc";
    let report = check_rapid(&rapid(), name);
    let errors = report.matching(Severity::Error, Category::Filename);
    assert!(errors.iter().any(|f| f.message.contains("after end date")));
}

#[test]
fn test_detected_product() {
    let registry = registry();
    let report = validate_detected(&rapid(), &registry, RAPID_TRANSPORTS);
    assert_eq!(report.file_type(), Some("RAPID/component_transports"));
    assert_clean(&report);

    let report = validate_detected(&rapid(), &registry, "OS_FRAM_20040402-20040403_DPR_transports_T12H.nc");
    assert_eq!(report.file_type(), None);
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.findings()[0].category, Category::Filename);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_report_rendering() {
    let mut ds = rapid();
    ds.attrs.remove("title");
    ds.set_attr("creator_email", "someone@example.org");
    let report = check_rapid(&ds, RAPID_TRANSPORTS);

    let text = report.to_string();
    assert!(text.starts_with(&"=".repeat(60)));
    assert!(text.contains("Status: FAIL"));
    assert!(text.contains("Errors: 1"));
    assert!(text.contains("Warnings: 1"));
    assert!(text.contains(" ERRORS "));
    assert!(text.contains(" 1. [attribute] title: mandatory global attribute is missing"));
    assert!(text.contains(" WARNINGS "));

    let json: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["passed"], false);
    assert_eq!(json["error_count"], 1);
    assert_eq!(json["file_type"], "RAPID/component_transports");
    assert_eq!(json["findings"].as_array().unwrap().len(), 2);
}
