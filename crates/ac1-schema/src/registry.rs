//! Schema registry: loads, validates and serves [`SchemaDefinition`]s.
//!
//! The registry is an ordinary value. Build it once with
//! [`SchemaRegistry::builtin`] or [`SchemaRegistry::from_dir`] and pass it by
//! reference; it is never mutated after loading.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use ac1_common::filename::parse_filename;
use ac1_common::{expand_env_vars, follows_canonical_order, ContentType, DataType, N_COMPONENT, TIME};
use serde::Deserialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::definition::{
    AttrSource, DimensionSpec, FilenameTemplate, GlobalAttributeSpec, Requirement,
    SchemaDefinition, VariableSpec,
};
use crate::error::{SchemaError, SchemaResult};
use crate::mapping::{CoordinateSource, MappingTable, VariableMapping};
use crate::profile::{Profile, AC1_UNITS};

/// File name of the profile inside a schema directory.
pub const PROFILE_FILE: &str = "ac1.yaml";

const BUILTIN_PROFILE: &str = include_str!("../schemas/ac1.yaml");
const BUILTIN_ARRAYS: &[(&str, &str)] = &[
    ("rapid.yaml", include_str!("../schemas/rapid.yaml")),
    ("osnap.yaml", include_str!("../schemas/osnap.yaml")),
    ("move.yaml", include_str!("../schemas/move.yaml")),
    ("samba.yaml", include_str!("../schemas/samba.yaml")),
];

// ============================================================================
// File formats
// ============================================================================

/// One array's schema file.
#[derive(Debug, Deserialize)]
struct ArrayFile {
    array: String,
    #[serde(default)]
    site_code: Option<String>,
    /// Fixed global attributes shared by every product of the array
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    products: BTreeMap<String, ProductFile>,
}

#[derive(Debug, Deserialize)]
struct ProductFile {
    #[serde(default)]
    description: Option<String>,
    content_type: ContentType,
    tag: String,
    dimensions: Vec<DimensionSpec>,
    #[serde(default)]
    forbidden_dimensions: Vec<String>,
    coordinates: Vec<CoordinateEntry>,
    variables: Vec<VariableSpec>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    mapping: MappingTable,
}

/// A product coordinate: a profile template by name, or a full spec.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordinateEntry {
    Name(String),
    Spec(VariableSpec),
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    profile: Arc<Profile>,
    schemas: BTreeMap<(String, String), SchemaDefinition>,
}

impl SchemaRegistry {
    /// Registry with the schemas compiled into the crate.
    pub fn builtin() -> SchemaResult<Self> {
        let arrays: Vec<(String, String)> = BUILTIN_ARRAYS
            .iter()
            .map(|(origin, content)| (format!("builtin:{}", origin), content.to_string()))
            .collect();
        Self::from_sources(("builtin:ac1.yaml", BUILTIN_PROFILE), &arrays)
    }

    /// Load `ac1.yaml` plus every other `*.yaml`/`*.yml` file of a directory,
    /// expanding `${VAR}` and `${VAR:-default}` references.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> SchemaResult<Self> {
        let dir = dir.as_ref();
        let profile_path = dir.join(PROFILE_FILE);
        let profile = read_expanded(&profile_path)?;

        let mut arrays = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| SchemaError::Io {
                path: dir.to_path_buf(),
                source: e.into(),
            })?;
            let path = entry.path();
            let is_yaml = matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yaml") | Some("yml")
            );
            if !entry.file_type().is_file() || !is_yaml || path == profile_path {
                continue;
            }
            arrays.push((path.display().to_string(), read_expanded(path)?));
        }

        let origin = profile_path.display().to_string();
        Self::from_sources((origin.as_str(), profile.as_str()), &arrays)
    }

    /// Build from in-memory YAML: `(origin, content)` of the profile and of
    /// each array file. Origins only label error messages.
    pub fn from_sources(profile: (&str, &str), arrays: &[(String, String)]) -> SchemaResult<Self> {
        let (profile_origin, profile_yaml) = profile;
        let profile: Profile = serde_yaml::from_str(profile_yaml).map_err(|e| SchemaError::Yaml {
            origin: profile_origin.to_string(),
            source: e,
        })?;
        validate_profile(&profile, profile_origin)?;
        let profile = Arc::new(profile);

        let mut schemas = BTreeMap::new();
        for (origin, content) in arrays {
            let file: ArrayFile = serde_yaml::from_str(content).map_err(|e| SchemaError::Yaml {
                origin: origin.clone(),
                source: e,
            })?;
            let array_key = file.array.to_ascii_uppercase();

            for (product, product_file) in &file.products {
                let schema = resolve_product(&profile, &file, product, product_file, origin)?;
                validate_schema(&schema, origin)?;

                debug!(
                    array = %schema.array,
                    product = %schema.product,
                    variables = schema.variables.len(),
                    "Registered schema"
                );
                let key = (array_key.clone(), product.clone());
                if schemas.insert(key, schema).is_some() {
                    return Err(SchemaError::invalid(
                        origin.as_str(),
                        format!("duplicate schema for array '{}' product '{}'", file.array, product),
                    ));
                }
            }
        }

        info!(schemas = schemas.len(), "Loaded schema registry");
        Ok(Self { profile, schemas })
    }

    /// Schema for an (array, product) pair; the array id is case-insensitive.
    pub fn get_schema(&self, array: &str, product: &str) -> SchemaResult<&SchemaDefinition> {
        self.schemas
            .get(&(array.to_ascii_uppercase(), product.to_string()))
            .ok_or_else(|| SchemaError::UnknownSchema {
                array: array.to_string(),
                product: product.to_string(),
            })
    }

    /// Schema whose filename template matches `filename`, if any.
    pub fn detect_product(&self, filename: &str) -> Option<&SchemaDefinition> {
        let parsed = parse_filename(filename).ok()?;
        self.schemas.values().find(|s| s.matches_filename(&parsed))
    }

    pub fn schemas(&self) -> impl Iterator<Item = &SchemaDefinition> {
        self.schemas.values()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn read_expanded(path: &Path) -> SchemaResult<String> {
    let content = fs::read_to_string(path).map_err(|e| SchemaError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    expand_env_vars(&content).map_err(|e| SchemaError::Substitution {
        origin: path.display().to_string(),
        reason: e.to_string(),
    })
}

// ============================================================================
// Resolution
// ============================================================================

fn resolve_product(
    profile: &Arc<Profile>,
    file: &ArrayFile,
    product: &str,
    def: &ProductFile,
    origin: &str,
) -> SchemaResult<SchemaDefinition> {
    let declared: HashSet<&str> = def.dimensions.iter().map(|d| d.name.as_str()).collect();

    let mut coordinates = Vec::with_capacity(def.coordinates.len());
    for entry in &def.coordinates {
        let spec = match entry {
            CoordinateEntry::Spec(spec) => spec.clone(),
            CoordinateEntry::Name(name) => {
                let mut spec = profile.coordinate(name).cloned().ok_or_else(|| {
                    SchemaError::invalid(
                        origin,
                        format!("product '{}' references unknown coordinate '{}'", product, name),
                    )
                })?;
                spec.dims = if declared.contains(name.as_str()) {
                    vec![name.clone()]
                } else {
                    Vec::new()
                };
                spec
            }
        };
        coordinates.push(with_vocabulary(profile, spec));
    }

    let variables = def
        .variables
        .iter()
        .cloned()
        .map(|spec| with_vocabulary(profile, spec))
        .collect();

    let mut global_attributes = profile.global_attributes.clone();
    for (name, value) in file.attributes.iter().chain(&def.attributes) {
        let source = AttrSource::Fixed {
            value: value.clone(),
        };
        match global_attributes.iter_mut().find(|a| &a.name == name) {
            Some(spec) => spec.source = source,
            None => global_attributes.push(GlobalAttributeSpec {
                name: name.clone(),
                requirement: Requirement::Suggested,
                source,
                rule: None,
            }),
        }
    }

    Ok(SchemaDefinition {
        array: file.array.clone(),
        product: product.to_string(),
        site_code: file.site_code.clone().unwrap_or_else(|| file.array.clone()),
        description: def.description.clone(),
        template: FilenameTemplate {
            content_type: def.content_type,
            tag: def.tag.clone(),
        },
        dimensions: def.dimensions.clone(),
        forbidden_dimensions: def.forbidden_dimensions.clone(),
        coordinates,
        variables,
        global_attributes,
        mapping: def.mapping.clone(),
        profile: Arc::clone(profile),
    })
}

/// Fill the vocabulary URL from the profile when the spec names a known
/// standard name but no URL.
fn with_vocabulary(profile: &Profile, mut spec: VariableSpec) -> VariableSpec {
    if spec.vocabulary.is_none() {
        if let Some(url) = spec.standard_name.as_deref().and_then(|s| profile.vocabulary_for(s)) {
            spec.vocabulary = Some(url.to_string());
        }
    }
    spec
}

// ============================================================================
// Validation
// ============================================================================

fn validate_profile(profile: &Profile, origin: &str) -> SchemaResult<()> {
    if profile.approved_units.is_empty() {
        return Err(SchemaError::invalid(origin, "approved unit set is empty"));
    }
    if let Some(unit) = profile
        .approved_units
        .iter()
        .find(|u| !AC1_UNITS.contains(&u.as_str()))
    {
        return Err(SchemaError::invalid(
            origin,
            format!("approved unit '{}' is outside the AC1 unit set", unit),
        ));
    }
    for (alias, target) in &profile.unit_aliases {
        if !profile.is_approved_unit(&target.unit) {
            return Err(SchemaError::invalid(
                origin,
                format!("unit alias '{}' resolves to unapproved unit '{}'", alias, target.unit),
            ));
        }
    }
    let mut names = HashSet::new();
    for attr in &profile.global_attributes {
        if !names.insert(attr.name.as_str()) {
            return Err(SchemaError::invalid(
                origin,
                format!("global attribute '{}' listed twice", attr.name),
            ));
        }
    }
    Ok(())
}

fn validate_schema(schema: &SchemaDefinition, origin: &str) -> SchemaResult<()> {
    let fail = |reason: String| {
        Err(SchemaError::invalid(
            format!("{} ({}/{})", origin, schema.array, schema.product),
            reason,
        ))
    };

    // Dimensions
    let mut dim_names = HashSet::new();
    for dim in &schema.dimensions {
        if !dim_names.insert(dim.name.as_str()) {
            return fail(format!("dimension '{}' declared twice", dim.name));
        }
        if dim.unlimited != (dim.name == TIME) {
            return fail(format!("TIME must be the only unlimited dimension ('{}')", dim.name));
        }
    }
    if !dim_names.contains(TIME) {
        return fail("TIME dimension is mandatory".to_string());
    }
    if let Some(forbidden) = schema
        .forbidden_dimensions
        .iter()
        .find(|f| dim_names.contains(f.as_str()))
    {
        return fail(format!("dimension '{}' is both declared and forbidden", forbidden));
    }

    // Variables
    let mut var_names = HashSet::new();
    for spec in schema.coordinates.iter().chain(&schema.variables) {
        if !var_names.insert(spec.name.as_str()) {
            return fail(format!("variable '{}' declared twice", spec.name));
        }
        if let Some(dim) = spec.dims.iter().find(|d| !dim_names.contains(d.as_str())) {
            return fail(format!("variable '{}' uses undeclared dimension '{}'", spec.name, dim));
        }
        if !follows_canonical_order(&spec.dims) {
            return fail(format!(
                "variable '{}' dimensions {:?} break the canonical N_COMPONENT, TIME, Z, Y, X order",
                spec.name, spec.dims
            ));
        }
        if let Some(units) = &spec.units {
            let time_units = spec.name == TIME && Profile::is_time_units(units);
            if !time_units && !schema.profile.is_approved_unit(units) {
                return fail(format!("variable '{}' uses unapproved units '{}'", spec.name, units));
            }
        }
        if spec.dtype == DataType::String && spec.fill_value.is_some() {
            return fail(format!("string variable '{}' cannot have a fill value", spec.name));
        }
        if let (Some(lo), Some(hi)) = (spec.valid_min, spec.valid_max) {
            if lo > hi {
                return fail(format!("variable '{}' has valid_min > valid_max", spec.name));
            }
        }
    }
    if schema.coordinate(TIME).is_none() {
        return fail("TIME coordinate is mandatory".to_string());
    }

    validate_mapping(schema).or_else(fail)
}

fn validate_mapping(schema: &SchemaDefinition) -> Result<(), String> {
    for mapping in &schema.mapping.coordinates {
        if schema.coordinate(&mapping.target).is_none() {
            return Err(format!("mapping targets unknown coordinate '{}'", mapping.target));
        }
        if mapping.source == CoordinateSource::Index
            && schema
                .dimension(&mapping.target)
                .and_then(|d| d.size)
                .is_none()
        {
            return Err(format!(
                "index coordinate '{}' needs a fixed-size dimension",
                mapping.target
            ));
        }
    }

    let mut written = HashSet::new();
    for mapping in &schema.mapping.variables {
        for target in mapping.targets() {
            if schema.data_variable(target).is_none() {
                return Err(format!("mapping targets unknown variable '{}'", target));
            }
            if !written.insert(target) {
                return Err(format!("variable '{}' is mapped twice", target));
            }
        }

        match mapping {
            VariableMapping::Direct(direct) => {
                if let (Some(perm), Some(spec)) = (&direct.permutation, schema.data_variable(&direct.target)) {
                    let mut sorted = perm.clone();
                    sorted.sort_unstable();
                    if sorted != (0..spec.dims.len()).collect::<Vec<_>>() {
                        return Err(format!(
                            "permutation {:?} does not fit '{}' of rank {}",
                            perm,
                            direct.target,
                            spec.dims.len()
                        ));
                    }
                }
            }
            VariableMapping::Stack(stack) => {
                let leading = schema
                    .data_variable(&stack.target)
                    .and_then(|s| s.dims.first())
                    .map(String::as_str);
                if leading != Some(N_COMPONENT) {
                    return Err(format!("stacked variable '{}' must lead with N_COMPONENT", stack.target));
                }
                if let Some(size) = schema.dimension(N_COMPONENT).and_then(|d| d.size) {
                    if size != stack.components.len() {
                        return Err(format!(
                            "'{}' stacks {} components but N_COMPONENT is {}",
                            stack.target,
                            stack.components.len(),
                            size
                        ));
                    }
                }
                for label in [&stack.name_variable, &stack.description_variable].into_iter().flatten() {
                    let fits = schema
                        .data_variable(label)
                        .is_some_and(|s| s.dtype == DataType::String && s.dims == [N_COMPONENT]);
                    if !fits {
                        return Err(format!("'{}' must be a string variable over N_COMPONENT", label));
                    }
                }
            }
        }
    }
    Ok(())
}
