//! Variable mapper: native dataset to AC1 variables.
//!
//! Builds a new [`Dataset`] holding exactly the coordinates and data
//! variables a schema's mapping table produces. Native variables that no
//! mapping reads are dropped. The native dataset is only borrowed.

use ac1_common::{ArrayData, DataType, Dataset, TimeUnits, Variable, AC1_TIME_UNITS, N_COMPONENT, TIME};
use ac1_schema::{
    CoordinateSource, DirectMapping, MappingTable, SchemaDefinition, StackMapping, UnitConversion,
    VariableMapping, VariableSpec,
};
use tracing::{debug, warn};

use crate::error::{ConversionError, Result};

/// A mapped dataset plus the optional mappings that were skipped.
#[derive(Debug, Clone)]
pub struct MappingOutput {
    pub dataset: Dataset,
    pub warnings: Vec<String>,
}

/// Map `native` into the variables of `schema` following `table`.
pub fn map_dataset(
    native: &Dataset,
    table: &MappingTable,
    schema: &SchemaDefinition,
) -> Result<MappingOutput> {
    let mut mapper = Mapper {
        native,
        schema,
        axis_sources: Vec::new(),
        out: Dataset::new(),
        warnings: Vec::new(),
    };

    // TIME first so that every other variable sees the record dimension
    let mut coordinates: Vec<(&str, CoordinateSource)> = table
        .coordinates
        .iter()
        .map(|m| (m.target.as_str(), m.source.clone()))
        .collect();
    for spec in &schema.coordinates {
        if !coordinates.iter().any(|(target, _)| *target == spec.name) {
            coordinates.push((
                spec.name.as_str(),
                CoordinateSource::Variable {
                    name: spec.name.clone(),
                    conversion: UnitConversion::Identity,
                },
            ));
        }
    }
    coordinates.sort_by_key(|(target, _)| *target != TIME);
    mapper.axis_sources = coordinates
        .iter()
        .filter_map(|(target, source)| match source {
            CoordinateSource::Variable { name, .. } => Some((target.to_string(), name.clone())),
            _ => None,
        })
        .collect();

    for (target, source) in &coordinates {
        mapper.map_coordinate(target, source)?;
    }
    for mapping in &table.variables {
        match mapping {
            VariableMapping::Direct(direct) => mapper.map_direct(direct)?,
            VariableMapping::Stack(stack) => mapper.map_stack(stack)?,
        }
    }

    debug!(
        array = %schema.array,
        product = %schema.product,
        variables = mapper.out.variables().count(),
        skipped = mapper.warnings.len(),
        "Mapped native dataset"
    );
    Ok(MappingOutput {
        dataset: mapper.out,
        warnings: mapper.warnings,
    })
}

struct Mapper<'a> {
    native: &'a Dataset,
    schema: &'a SchemaDefinition,
    /// Target coordinate and the native variable it is read from
    axis_sources: Vec<(String, String)>,
    out: Dataset,
    warnings: Vec<String>,
}

impl<'a> Mapper<'a> {
    // ========================================================================
    // Coordinates
    // ========================================================================

    fn map_coordinate(&mut self, target: &str, source: &CoordinateSource) -> Result<()> {
        let (native, schema) = (self.native, self.schema);
        let Some(spec) = schema.coordinate(target) else {
            return Err(shape_error(target, "not a coordinate of this product"));
        };

        let values = match source {
            CoordinateSource::Variable { name, conversion } => {
                let Some(var) = native.variable(name) else {
                    if spec.is_mandatory() {
                        return Err(ConversionError::MissingSourceVariable {
                            source_name: name.clone(),
                            target: target.to_string(),
                        });
                    }
                    self.skip(name, target);
                    return Ok(());
                };
                if var.dims().len() > 1 {
                    return Err(shape_error(
                        target,
                        format!("native '{}' has {} dimensions, expected 1", name, var.dims().len()),
                    ));
                }
                if target == TIME {
                    time_values(name, var)?
                } else {
                    let factor = self.conversion_factor(name, var, conversion, spec)?;
                    scaled(name, var.data(), factor, None)?
                }
            }
            CoordinateSource::Fixed { values } => values.clone(),
            CoordinateSource::Index => {
                let size = schema
                    .dimension(target)
                    .and_then(|d| d.size)
                    .ok_or_else(|| shape_error(target, "index coordinate without a fixed size"))?;
                (0..size).map(|i| i as f64).collect()
            }
        };

        let data = cast(target, ArrayData::Double(values), spec.dtype)?;
        let mut var = if spec.dims.is_empty() {
            if data.len() != 1 {
                return Err(shape_error(
                    target,
                    format!("scalar coordinate given {} values", data.len()),
                ));
            }
            Variable::new(target, Vec::new(), Vec::new(), data)?
        } else {
            self.declare(target, target, data.len())?;
            Variable::vector(target, data)
        };

        var.attrs = spec.attributes();
        debug!(coordinate = target, len = var.len(), "Mapped coordinate");
        self.out.add_coord(target, var)?;
        Ok(())
    }

    // ========================================================================
    // Data variables
    // ========================================================================

    fn map_direct(&mut self, mapping: &DirectMapping) -> Result<()> {
        let target = mapping.target.as_str();
        let native = self.native;
        let spec = self.data_spec(target)?;
        let Some(source) = native.variable(&mapping.source) else {
            return self.missing(&mapping.source, target, mapping.required);
        };

        let var = match &mapping.permutation {
            Some(perm) => source
                .permuted(&mapping.source, perm)
                .map_err(|e| shape_error(target, e.to_string()))?,
            None => source.clone(),
        };
        if let Some((axis, dim)) = var
            .dims()
            .iter()
            .zip(&spec.dims)
            .find(|(axis, dim)| !self.axis_matches(axis, dim))
        {
            return Err(shape_error(
                target,
                format!("native axis '{}' of '{}' cannot carry {}", axis, mapping.source, dim),
            ));
        }
        let var = var.renamed_dims(spec.dims.clone()).ok_or_else(|| {
            shape_error(
                target,
                format!(
                    "native '{}' has dimensions {:?}, expected {:?}",
                    mapping.source,
                    var.dims(),
                    spec.dims
                ),
            )
        })?;

        let data = if spec.dtype == DataType::String {
            var.data().clone()
        } else {
            let factor = self.conversion_factor(&mapping.source, source, &mapping.conversion, spec)?;
            ArrayData::Double(scaled(&mapping.source, var.data(), factor, spec.fill_value)?)
        };
        let data = cast(target, data, spec.dtype)?;

        for (dim, size) in spec.dims.iter().zip(var.shape()) {
            self.declare(target, dim, *size)?;
        }
        let mut var = var.with_data(target, data)?;
        var.attrs = spec.attributes();

        debug!(
            source = %mapping.source,
            variable = target,
            shape = ?var.shape(),
            "Mapped variable"
        );
        self.out.add_data_var(target, var)?;
        Ok(())
    }

    fn map_stack(&mut self, mapping: &StackMapping) -> Result<()> {
        let target = mapping.target.as_str();
        let native = self.native;
        let spec = self.data_spec(target)?;

        let mut series = Vec::with_capacity(mapping.components.len());
        for component in &mapping.components {
            let Some(source) = native.variable(&component.source) else {
                return self.missing(&component.source, target, mapping.required);
            };
            if source.dims().len() != 1 {
                return Err(shape_error(
                    target,
                    format!("component '{}' must be one-dimensional", component.source),
                ));
            }
            let factor = self.conversion_factor(&component.source, source, &mapping.conversion, spec)?;
            series.push(ArrayData::Double(scaled(
                &component.source,
                source.data(),
                factor,
                spec.fill_value,
            )?));
        }

        let len = series.first().map(ArrayData::len).unwrap_or(0);
        if let Some(bad) = mapping
            .components
            .iter()
            .zip(&series)
            .find(|(_, s)| s.len() != len)
        {
            return Err(shape_error(
                target,
                format!("component '{}' has {} values, expected {}", bad.0.source, bad.1.len(), len),
            ));
        }
        let parts: Vec<&ArrayData> = series.iter().collect();
        let stacked = ArrayData::concat(&parts)
            .ok_or_else(|| shape_error(target, "components have mixed types"))?;
        let stacked = cast(target, stacked, spec.dtype)?;

        let n = mapping.components.len();
        let shape = vec![n, len];
        for (dim, size) in spec.dims.iter().zip(&shape) {
            self.declare(target, dim, *size)?;
        }
        let mut var = Variable::new(target, spec.dims.clone(), shape, stacked)?;
        var.attrs = spec.attributes();
        self.out.add_data_var(target, var)?;

        let labels = [
            (
                &mapping.name_variable,
                mapping.components.iter().map(|c| c.name.clone()).collect::<Vec<_>>(),
            ),
            (
                &mapping.description_variable,
                mapping.components.iter().map(|c| c.description.clone()).collect(),
            ),
        ];
        for (name, values) in labels {
            let Some(name) = name else { continue };
            let label_spec = self.data_spec(name)?;
            let mut label = Variable::vector(N_COMPONENT, ArrayData::String(values));
            label.attrs = label_spec.attributes();
            self.out.add_data_var(name, label)?;
        }

        debug!(variable = target, components = n, len, "Stacked components");
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn data_spec(&self, target: &str) -> Result<&'a VariableSpec> {
        self.schema
            .data_variable(target)
            .ok_or_else(|| shape_error(target, "not a data variable of this product"))
    }

    /// Whether native axis `axis` may be labelled `dim`: same name ignoring
    /// case, or the axis of the native coordinate `dim` is read from.
    fn axis_matches(&self, axis: &str, dim: &str) -> bool {
        if axis.eq_ignore_ascii_case(dim) {
            return true;
        }
        self.axis_sources
            .iter()
            .filter(|(target, _)| target == dim)
            .any(|(_, source)| {
                axis.eq_ignore_ascii_case(source)
                    || self
                        .native
                        .variable(source)
                        .is_some_and(|v| v.dims().iter().any(|d| d == axis))
            })
    }

    fn missing(&mut self, source: &str, target: &str, required: bool) -> Result<()> {
        if required {
            return Err(ConversionError::MissingSourceVariable {
                source_name: source.to_string(),
                target: target.to_string(),
            });
        }
        self.skip(source, target);
        Ok(())
    }

    fn skip(&mut self, source: &str, target: &str) {
        warn!(source, variable = target, "Optional native variable missing, skipping");
        self.warnings.push(format!(
            "native variable '{}' not found, '{}' not written",
            source, target
        ));
    }

    /// Declare `dim` in the output, checking the schema's fixed size and any
    /// size already declared by another variable.
    fn declare(&mut self, variable: &str, dim: &str, size: usize) -> Result<()> {
        if let Some(expected) = self.schema.dimension(dim).and_then(|d| d.size) {
            if expected != size {
                return Err(shape_error(
                    variable,
                    format!("dimension {} has size {}, schema requires {}", dim, size, expected),
                ));
            }
        }
        let declared = if dim == TIME {
            self.out.add_unlimited_dimension(dim, size)
        } else {
            self.out.add_dimension(dim, size)
        };
        declared.map_err(|e| shape_error(variable, e.to_string()))
    }

    /// Multiplier taking native values into the target spec's units.
    fn conversion_factor(
        &self,
        name: &str,
        var: &Variable,
        conversion: &UnitConversion,
        spec: &VariableSpec,
    ) -> Result<f64> {
        match conversion {
            UnitConversion::Identity => Ok(1.0),
            UnitConversion::Scale { factor } => Ok(*factor),
            UnitConversion::Lookup => {
                let units = var.text_attr("units").unwrap_or_default();
                let alias = self.schema.profile.resolve_unit(units).ok_or_else(|| {
                    ConversionError::UnknownUnit {
                        variable: name.to_string(),
                        units: units.to_string(),
                    }
                })?;
                match &spec.units {
                    Some(expected) if *expected != alias.unit => Err(ConversionError::IncompatibleUnit {
                        variable: name.to_string(),
                        found: units.to_string(),
                        expected: expected.clone(),
                    }),
                    _ => Ok(alias.factor),
                }
            }
        }
    }
}

fn shape_error(variable: &str, reason: impl Into<String>) -> ConversionError {
    ConversionError::ShapeMismatch {
        variable: variable.to_string(),
        reason: reason.into(),
    }
}

/// Native values times `factor`; non-finite values become `fill` when the
/// target declares one. A unit factor leaves values bit-identical.
fn scaled(name: &str, data: &ArrayData, factor: f64, fill: Option<f64>) -> Result<Vec<f64>> {
    let values = data
        .to_f64_vec()
        .ok_or_else(|| shape_error(name, "expected numeric data"))?;
    Ok(values
        .into_iter()
        .map(|v| match (v.is_finite(), fill) {
            (false, Some(fill)) => fill,
            (false, None) => v,
            _ if factor == 1.0 => v,
            _ => v * factor,
        })
        .collect())
}

fn cast(target: &str, data: ArrayData, dtype: DataType) -> Result<ArrayData> {
    let from = data.dtype();
    data.cast(dtype)
        .ok_or_else(|| shape_error(target, format!("cannot store {} data as {}", from, dtype)))
}

/// TIME values re-encoded as seconds since 1970-01-01T00:00:00Z.
fn time_values(name: &str, var: &Variable) -> Result<Vec<f64>> {
    let units_attr = var.text_attr("units").unwrap_or(AC1_TIME_UNITS);
    let units = TimeUnits::parse(units_attr).map_err(|_| ConversionError::UnknownUnit {
        variable: name.to_string(),
        units: units_attr.to_string(),
    })?;
    let values = scaled(name, var.data(), 1.0, None)?;
    if units.is_ac1() {
        return Ok(values);
    }
    Ok(values.into_iter().map(|v| units.to_epoch_seconds(v)).collect())
}
