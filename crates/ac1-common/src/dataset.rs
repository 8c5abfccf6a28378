//! In-memory labeled multi-dimensional dataset.
//!
//! A [`Dataset`] is the contract between the converter and whatever reads or
//! writes NetCDF files: named dimensions, coordinate and data variables with
//! typed flat buffers (row-major), and attribute maps at dataset and variable
//! granularity. Variables can only be inserted when their shape agrees with the
//! declared dimension sizes, so a `Dataset` value is always self-consistent.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};
use crate::TIME;

/// Attribute map, ordered by name for stable output.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Storage datatype of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Float32,
    Double,
    Int,
    Byte,
    String,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Float32 => "float32",
            DataType::Double => "double",
            DataType::Int => "int",
            DataType::Byte => "byte",
            DataType::String => "string",
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::String)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    Text(String),
    Float32(f32),
    Double(f64),
    Int(i32),
    Byte(i8),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Text(s) => s.trim().parse().ok(),
            AttrValue::Float32(v) => Some(*v as f64),
            AttrValue::Double(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Byte(v) => Some(*v as f64),
        }
    }

    /// Datatype this value would be stored as.
    pub fn dtype(&self) -> DataType {
        match self {
            AttrValue::Text(_) => DataType::String,
            AttrValue::Float32(_) => DataType::Float32,
            AttrValue::Double(_) => DataType::Double,
            AttrValue::Int(_) => DataType::Int,
            AttrValue::Byte(_) => DataType::Byte,
        }
    }

    /// Empty text (after trimming) counts as missing; numbers never do.
    pub fn is_empty(&self) -> bool {
        match self {
            AttrValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Build a numeric value of the given datatype, e.g. a `_FillValue`.
    pub fn numeric(dtype: DataType, value: f64) -> Option<Self> {
        match dtype {
            DataType::Float32 => Some(AttrValue::Float32(value as f32)),
            DataType::Double => Some(AttrValue::Double(value)),
            DataType::Int => Some(AttrValue::Int(value as i32)),
            DataType::Byte => Some(AttrValue::Byte(value as i8)),
            DataType::String => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Float32(v) => write!(f, "{}", v),
            AttrValue::Double(v) => write!(f, "{}", v),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Byte(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Double(v)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::Float32(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v)
    }
}

/// Typed flat buffer of a variable, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "values", rename_all = "lowercase")]
pub enum ArrayData {
    Float32(Vec<f32>),
    Double(Vec<f64>),
    Int(Vec<i32>),
    Byte(Vec<i8>),
    String(Vec<String>),
}

impl ArrayData {
    pub fn dtype(&self) -> DataType {
        match self {
            ArrayData::Float32(_) => DataType::Float32,
            ArrayData::Double(_) => DataType::Double,
            ArrayData::Int(_) => DataType::Int,
            ArrayData::Byte(_) => DataType::Byte,
            ArrayData::String(_) => DataType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArrayData::Float32(v) => v.len(),
            ArrayData::Double(v) => v.len(),
            ArrayData::Int(v) => v.len(),
            ArrayData::Byte(v) => v.len(),
            ArrayData::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values widened to f64; `None` for string data.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            ArrayData::Float32(v) => Some(v.iter().map(|x| *x as f64).collect()),
            ArrayData::Double(v) => Some(v.clone()),
            ArrayData::Int(v) => Some(v.iter().map(|x| *x as f64).collect()),
            ArrayData::Byte(v) => Some(v.iter().map(|x| *x as f64).collect()),
            ArrayData::String(_) => None,
        }
    }

    /// Convert to another numeric storage type. Numeric to string and string
    /// to numeric are not conversions and yield `None`.
    pub fn cast(&self, dtype: DataType) -> Option<ArrayData> {
        if self.dtype() == dtype {
            return Some(self.clone());
        }
        let values = self.to_f64_vec()?;
        match dtype {
            DataType::Float32 => Some(ArrayData::Float32(values.iter().map(|v| *v as f32).collect())),
            DataType::Double => Some(ArrayData::Double(values)),
            DataType::Int => Some(ArrayData::Int(values.iter().map(|v| v.round() as i32).collect())),
            DataType::Byte => Some(ArrayData::Byte(values.iter().map(|v| v.round() as i8).collect())),
            DataType::String => None,
        }
    }

    /// Minimum and maximum of the finite values, if any.
    pub fn finite_extrema(&self) -> Option<(f64, f64)> {
        let values = self.to_f64_vec()?;
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    fn permute(&self, shape: &[usize], perm: &[usize]) -> ArrayData {
        match self {
            ArrayData::Float32(v) => ArrayData::Float32(permute_buffer(v, shape, perm)),
            ArrayData::Double(v) => ArrayData::Double(permute_buffer(v, shape, perm)),
            ArrayData::Int(v) => ArrayData::Int(permute_buffer(v, shape, perm)),
            ArrayData::Byte(v) => ArrayData::Byte(permute_buffer(v, shape, perm)),
            ArrayData::String(v) => ArrayData::String(permute_buffer(v, shape, perm)),
        }
    }

    /// Concatenate equally-typed buffers; `None` on a type mismatch.
    pub fn concat(parts: &[&ArrayData]) -> Option<ArrayData> {
        let first = parts.first()?;
        let mut out = match first {
            ArrayData::Float32(_) => ArrayData::Float32(Vec::new()),
            ArrayData::Double(_) => ArrayData::Double(Vec::new()),
            ArrayData::Int(_) => ArrayData::Int(Vec::new()),
            ArrayData::Byte(_) => ArrayData::Byte(Vec::new()),
            ArrayData::String(_) => ArrayData::String(Vec::new()),
        };
        for part in parts {
            match (&mut out, part) {
                (ArrayData::Float32(o), ArrayData::Float32(p)) => o.extend_from_slice(p),
                (ArrayData::Double(o), ArrayData::Double(p)) => o.extend_from_slice(p),
                (ArrayData::Int(o), ArrayData::Int(p)) => o.extend_from_slice(p),
                (ArrayData::Byte(o), ArrayData::Byte(p)) => o.extend_from_slice(p),
                (ArrayData::String(o), ArrayData::String(p)) => o.extend_from_slice(p),
                _ => return None,
            }
        }
        Some(out)
    }
}

fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// Reorder a row-major buffer so that output axis `i` is input axis `perm[i]`.
fn permute_buffer<T: Clone>(data: &[T], shape: &[usize], perm: &[usize]) -> Vec<T> {
    let in_strides = row_major_strides(shape);
    let out_shape: Vec<usize> = perm.iter().map(|&p| shape[p]).collect();
    let mut out = Vec::with_capacity(data.len());
    let mut index = vec![0usize; out_shape.len()];

    for _ in 0..data.len() {
        let offset: usize = index
            .iter()
            .zip(perm)
            .map(|(&i, &p)| i * in_strides[p])
            .sum();
        out.push(data[offset].clone());

        for axis in (0..index.len()).rev() {
            index[axis] += 1;
            if index[axis] < out_shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
    out
}

/// A named dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub size: usize,
    #[serde(default)]
    pub unlimited: bool,
}

/// A coordinate or data variable: dimension names, shape, data and attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    dims: Vec<String>,
    shape: Vec<usize>,
    data: ArrayData,
    #[serde(default)]
    pub attrs: Attributes,
}

impl Variable {
    /// Create a variable, checking that `data` fills `shape` exactly.
    pub fn new(
        name: &str,
        dims: Vec<String>,
        shape: Vec<usize>,
        data: ArrayData,
    ) -> DatasetResult<Self> {
        let var = Self {
            dims,
            shape,
            data,
            attrs: Attributes::new(),
        };
        var.check(name)?;
        Ok(var)
    }

    /// One-dimensional variable spanning `dim`.
    pub fn vector(dim: &str, data: ArrayData) -> Self {
        let len = data.len();
        Self {
            dims: vec![dim.to_string()],
            shape: vec![len],
            data,
            attrs: Attributes::new(),
        }
    }

    fn check(&self, name: &str) -> DatasetResult<()> {
        if self.dims.len() != self.shape.len() {
            return Err(DatasetError::RankMismatch {
                variable: name.to_string(),
                dims: self.dims.len(),
                rank: self.shape.len(),
            });
        }
        let expected: usize = self.shape.iter().product();
        if expected != self.data.len() {
            return Err(DatasetError::ShapeLength {
                variable: name.to_string(),
                shape: self.shape.clone(),
                expected,
                found: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn text_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_text)
    }

    /// Size of `dim` within this variable.
    pub fn size_of(&self, dim: &str) -> Option<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .map(|i| self.shape[i])
    }

    /// Same dimensions and shape, new data of the same length.
    pub fn with_data(&self, name: &str, data: ArrayData) -> DatasetResult<Self> {
        let var = Self {
            dims: self.dims.clone(),
            shape: self.shape.clone(),
            data,
            attrs: self.attrs.clone(),
        };
        var.check(name)?;
        Ok(var)
    }

    /// Transpose: output axis `i` is input axis `perm[i]`. Values are moved,
    /// never altered.
    pub fn permuted(&self, name: &str, perm: &[usize]) -> DatasetResult<Self> {
        let rank = self.dims.len();
        let mut seen = vec![false; rank];
        let valid = perm.len() == rank
            && perm.iter().all(|&p| {
                if p >= rank || seen[p] {
                    false
                } else {
                    seen[p] = true;
                    true
                }
            });
        if !valid {
            return Err(DatasetError::InvalidPermutation {
                variable: name.to_string(),
                permutation: perm.to_vec(),
                rank,
            });
        }

        Ok(Self {
            dims: perm.iter().map(|&p| self.dims[p].clone()).collect(),
            shape: perm.iter().map(|&p| self.shape[p]).collect(),
            data: self.data.permute(&self.shape, perm),
            attrs: self.attrs.clone(),
        })
    }

    /// Rename dimensions in place of their position, e.g. `depth` -> `DEPTH`.
    pub fn renamed_dims(&self, dims: Vec<String>) -> Option<Self> {
        if dims.len() != self.dims.len() {
            return None;
        }
        Some(Self {
            dims,
            shape: self.shape.clone(),
            data: self.data.clone(),
            attrs: self.attrs.clone(),
        })
    }
}

/// Whether a variable is a coordinate or a data variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableRole {
    Coordinate,
    Data,
}

/// Settings the external NetCDF writer applies to an AC1 dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingHints {
    /// NetCDF file format, e.g. `NETCDF4_CLASSIC`
    pub format: String,
    /// zlib deflate level for data variables
    pub deflate_level: u8,
    /// Dimensions along which data variables are chunked
    pub chunk_dimensions: Vec<String>,
}

impl Default for EncodingHints {
    fn default() -> Self {
        Self {
            format: "NETCDF4_CLASSIC".to_string(),
            deflate_level: 6,
            chunk_dimensions: vec![TIME.to_string()],
        }
    }
}

/// Labeled multi-dimensional array collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    dimensions: Vec<Dimension>,
    coords: BTreeMap<String, Variable>,
    data_vars: BTreeMap<String, Variable>,
    pub attrs: Attributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<EncodingHints>,
}

/// Unchecked serde form of [`Dataset`].
#[derive(Deserialize)]
struct RawDataset {
    #[serde(default)]
    dimensions: Vec<Dimension>,
    #[serde(default)]
    coords: BTreeMap<String, Variable>,
    #[serde(default)]
    data_vars: BTreeMap<String, Variable>,
    #[serde(default)]
    attrs: Attributes,
    #[serde(default)]
    encoding: Option<EncodingHints>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = DatasetError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        let mut ds = Dataset {
            attrs: raw.attrs,
            encoding: raw.encoding,
            ..Default::default()
        };
        for dim in raw.dimensions {
            ds.declare(&dim.name, dim.size, dim.unlimited)?;
        }
        for (name, var) in raw.coords {
            ds.add_coord(&name, var)?;
        }
        for (name, var) in raw.data_vars {
            ds.add_data_var(&name, var)?;
        }
        Ok(ds)
    }
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON dataset document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn declare(&mut self, name: &str, size: usize, unlimited: bool) -> DatasetResult<()> {
        if let Some(existing) = self.dimensions.iter_mut().find(|d| d.name == name) {
            if existing.size != size {
                return Err(DatasetError::DimensionConflict {
                    dimension: name.to_string(),
                    existing: existing.size,
                    requested: size,
                });
            }
            existing.unlimited |= unlimited;
            return Ok(());
        }
        self.dimensions.push(Dimension {
            name: name.to_string(),
            size,
            unlimited,
        });
        Ok(())
    }

    /// Declare a fixed-size dimension. Redeclaring with the same size is a no-op.
    pub fn add_dimension(&mut self, name: &str, size: usize) -> DatasetResult<()> {
        self.declare(name, size, false)
    }

    /// Declare an unlimited (record) dimension with its current length.
    pub fn add_unlimited_dimension(&mut self, name: &str, size: usize) -> DatasetResult<()> {
        self.declare(name, size, true)
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimension(name).is_some()
    }

    fn check_against_dims(&self, name: &str, var: &Variable) -> DatasetResult<()> {
        var.check(name)?;
        for (dim, &size) in var.dims.iter().zip(&var.shape) {
            let declared = self
                .dimension(dim)
                .ok_or_else(|| DatasetError::UnknownDimension {
                    variable: name.to_string(),
                    dimension: dim.clone(),
                })?;
            if declared.size != size {
                return Err(DatasetError::DimensionSize {
                    dimension: dim.clone(),
                    variable: name.to_string(),
                    expected: declared.size,
                    found: size,
                });
            }
        }
        if self.coords.contains_key(name) || self.data_vars.contains_key(name) {
            return Err(DatasetError::DuplicateVariable(name.to_string()));
        }
        Ok(())
    }

    pub fn add_coord(&mut self, name: &str, var: Variable) -> DatasetResult<()> {
        self.check_against_dims(name, &var)?;
        self.coords.insert(name.to_string(), var);
        Ok(())
    }

    pub fn add_data_var(&mut self, name: &str, var: Variable) -> DatasetResult<()> {
        self.check_against_dims(name, &var)?;
        self.data_vars.insert(name.to_string(), var);
        Ok(())
    }

    pub fn coord(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name)
    }

    pub fn data_var(&self, name: &str) -> Option<&Variable> {
        self.data_vars.get(name)
    }

    /// Look up a variable in either namespace, coordinates first.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name).or_else(|| self.data_vars.get(name))
    }

    /// Mutable access to a variable's attributes; data and shape stay fixed.
    pub fn variable_attrs_mut(&mut self, name: &str) -> Option<&mut Attributes> {
        if let Some(var) = self.coords.get_mut(name) {
            return Some(&mut var.attrs);
        }
        self.data_vars.get_mut(name).map(|v| &mut v.attrs)
    }

    pub fn coords(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.coords.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn data_vars(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.data_vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All variables, coordinates first.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &Variable, VariableRole)> {
        self.coords()
            .map(|(k, v)| (k, v, VariableRole::Coordinate))
            .chain(self.data_vars().map(|(k, v)| (k, v, VariableRole::Data)))
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        self.coords
            .remove(name)
            .or_else(|| self.data_vars.remove(name))
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn text_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_text)
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<AttrValue>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    /// Extrema of the TIME coordinate values, in the coordinate's own units.
    pub fn time_extrema(&self) -> Option<(f64, f64)> {
        self.coord(TIME).and_then(|t| t.data().finite_extrema())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_time() -> Variable {
        // (depth=2, time=3): row d holds d*10 + t
        Variable::new(
            "sf",
            vec!["depth".into(), "time".into()],
            vec![2, 3],
            ArrayData::Double(vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]),
        )
        .unwrap()
    }

    #[test]
    fn test_variable_shape_checked() {
        let err = Variable::new(
            "bad",
            vec!["TIME".into()],
            vec![4],
            ArrayData::Double(vec![1.0, 2.0]),
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::ShapeLength { expected: 4, found: 2, .. }));
    }

    #[test]
    fn test_transpose_preserves_values() {
        let t = depth_time().permuted("sf", &[1, 0]).unwrap();
        assert_eq!(t.dims(), &["time".to_string(), "depth".to_string()]);
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(
            t.data(),
            &ArrayData::Double(vec![0.0, 10.0, 1.0, 11.0, 2.0, 12.0])
        );
    }

    #[test]
    fn test_identity_permutation() {
        let v = depth_time();
        assert_eq!(v.permuted("sf", &[0, 1]).unwrap(), v);
    }

    #[test]
    fn test_invalid_permutation() {
        assert!(depth_time().permuted("sf", &[0, 0]).is_err());
        assert!(depth_time().permuted("sf", &[0]).is_err());
        assert!(depth_time().permuted("sf", &[0, 2]).is_err());
    }

    #[test]
    fn test_three_axis_transpose() {
        // shape (2, 3, 4) with value = linear index
        let data: Vec<i32> = (0..24).collect();
        let v = Variable::new(
            "cube",
            vec!["a".into(), "b".into(), "c".into()],
            vec![2, 3, 4],
            ArrayData::Int(data),
        )
        .unwrap();
        let p = v.permuted("cube", &[2, 0, 1]).unwrap();
        assert_eq!(p.shape(), &[4, 2, 3]);
        // out[c][a][b] == in[a][b][c] == a*12 + b*4 + c
        if let ArrayData::Int(values) = p.data() {
            assert_eq!(values[0], 0);
            assert_eq!(values[1], 4); // c=0, a=0, b=1
            assert_eq!(values[3], 12); // c=0, a=1, b=0
            assert_eq!(values[6], 1); // c=1, a=0, b=0
        } else {
            panic!("expected int data");
        }
    }

    #[test]
    fn test_dataset_rejects_mismatched_dimension() {
        let mut ds = Dataset::new();
        ds.add_unlimited_dimension("TIME", 3).unwrap();
        let err = ds
            .add_data_var("X", Variable::vector("TIME", ArrayData::Double(vec![1.0, 2.0])))
            .unwrap_err();
        assert!(matches!(err, DatasetError::DimensionSize { .. }));

        let err = ds
            .add_data_var("Y", Variable::vector("DEPTH", ArrayData::Double(vec![1.0])))
            .unwrap_err();
        assert!(matches!(err, DatasetError::UnknownDimension { .. }));
    }

    #[test]
    fn test_dimension_redeclare() {
        let mut ds = Dataset::new();
        ds.add_dimension("DEPTH", 307).unwrap();
        ds.add_dimension("DEPTH", 307).unwrap();
        assert!(ds.add_dimension("DEPTH", 250).is_err());
        assert_eq!(ds.dimensions().len(), 1);
    }

    #[test]
    fn test_json_roundtrip_validates() {
        let mut ds = Dataset::new();
        ds.add_unlimited_dimension("TIME", 2).unwrap();
        ds.add_coord("TIME", Variable::vector("TIME", ArrayData::Double(vec![0.0, 43200.0])))
            .unwrap();
        ds.set_attr("title", "test");

        let json = ds.to_json_pretty().unwrap();
        let back = Dataset::from_json(&json).unwrap();
        assert_eq!(back, ds);
        assert_eq!(back.time_extrema(), Some((0.0, 43200.0)));

        let broken = json.replace("43200.0", "43200.0, 86400.0");
        assert!(Dataset::from_json(&broken).is_err());
    }

    #[test]
    fn test_finite_extrema_skips_nan() {
        let data = ArrayData::Float32(vec![f32::NAN, 3.0, -1.0]);
        assert_eq!(data.finite_extrema(), Some((-1.0, 3.0)));
        assert_eq!(ArrayData::String(vec!["a".into()]).finite_extrema(), None);
    }

    #[test]
    fn test_cast() {
        let data = ArrayData::Double(vec![1.4, 2.6]);
        assert_eq!(data.cast(DataType::Int), Some(ArrayData::Int(vec![1, 3])));
        assert_eq!(data.cast(DataType::Double), Some(data.clone()));
        assert_eq!(data.cast(DataType::String), None);
        assert_eq!(ArrayData::String(vec![]).cast(DataType::Double), None);
    }

    #[test]
    fn test_attr_value_is_empty() {
        assert!(AttrValue::from("  ").is_empty());
        assert!(!AttrValue::from(0.0).is_empty());
        assert_eq!(AttrValue::numeric(DataType::Float32, 1.5), Some(AttrValue::Float32(1.5)));
        assert_eq!(AttrValue::numeric(DataType::String, 1.0), None);
    }
}
