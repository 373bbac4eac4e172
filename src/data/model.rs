use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use serde::Serialize;

// ---------------------------------------------------------------------------
// FieldType / FieldSpec / AttributeSpec – what an ATOMS header describes
// ---------------------------------------------------------------------------

/// Storage type of a single per-particle field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Float,
}

impl FieldType {
    /// The Arrow column type used to hold values of this field.
    pub fn data_type(self) -> DataType {
        match self {
            FieldType::Int => DataType::Int64,
            FieldType::Float => DataType::Float64,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
        }
    }
}

/// A named, typed per-particle field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered field list for one ATOMS section, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeSpec {
    pub fields: Vec<FieldSpec>,
}

impl AttributeSpec {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.fields.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Bounds – simulation box for one timestep
// ---------------------------------------------------------------------------

/// Axis-aligned domain bounds stored as `[xlo, xhi, ylo, yhi, zlo, zhi]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Bounds(pub [f64; 6]);

impl Bounds {
    pub fn from_pairs(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Self {
        Bounds([x.0, x.1, y.0, y.1, z.0, z.1])
    }

    pub fn x(&self) -> (f64, f64) {
        (self.0[0], self.0[1])
    }

    pub fn y(&self) -> (f64, f64) {
        (self.0[2], self.0[3])
    }

    pub fn z(&self) -> (f64, f64) {
        (self.0[4], self.0[5])
    }

    pub fn as_array(&self) -> [f64; 6] {
        self.0
    }
}

// ---------------------------------------------------------------------------
// ParticleTable – the rows of one ATOMS section
// ---------------------------------------------------------------------------

/// Columnar particle data for a single timestep.
///
/// Columns are either `Int64` or `Float64`; the loaders never produce
/// anything else. Numeric columns can be read back as either type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleTable {
    batch: RecordBatch,
}

impl ParticleTable {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Build a table from parallel column arrays. All columns must share a
    /// length; Arrow rejects the batch otherwise.
    pub fn from_columns(
        schema: Arc<Schema>,
        columns: Vec<ArrayRef>,
    ) -> Result<Self, arrow::error::ArrowError> {
        RecordBatch::try_new(schema, columns).map(Self::new)
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    /// Storage type of a column, if present.
    pub fn column_type(&self, name: &str) -> Option<FieldType> {
        match self.batch.column_by_name(name)?.data_type() {
            DataType::Int64 => Some(FieldType::Int),
            DataType::Float64 => Some(FieldType::Float),
            _ => None,
        }
    }

    /// Column values as `f64`. Integer columns are widened.
    pub fn f64_column(&self, name: &str) -> Option<Vec<f64>> {
        let col = self.batch.column_by_name(name)?;
        column_as_f64(col)
    }

    /// Column values as `i64`. Float columns are accepted only when every
    /// value is integral.
    pub fn i64_column(&self, name: &str) -> Option<Vec<i64>> {
        let col = self.batch.column_by_name(name)?;
        column_as_i64(col)
    }

    /// `(x, y, z)` triple per particle, if all three columns are present.
    pub fn positions(&self) -> Option<Vec<[f64; 3]>> {
        let x = self.f64_column("x")?;
        let y = self.f64_column("y")?;
        let z = self.f64_column("z")?;
        Some(
            x.into_iter()
                .zip(y)
                .zip(z)
                .map(|((x, y), z)| [x, y, z])
                .collect(),
        )
    }

    /// Row-major view of every column as `f64`, one inner `Vec` per particle.
    pub fn to_row_major(&self) -> Vec<Vec<f64>> {
        let columns: Vec<Vec<f64>> = self
            .batch
            .columns()
            .iter()
            .map(|c| column_as_f64(c).unwrap_or_else(|| vec![f64::NAN; c.len()]))
            .collect();

        (0..self.num_rows())
            .map(|row| columns.iter().map(|col| col[row]).collect())
            .collect()
    }
}

fn column_as_f64(col: &ArrayRef) -> Option<Vec<f64>> {
    match col.data_type() {
        DataType::Float64 => Some(col.as_primitive::<Float64Type>().values().to_vec()),
        DataType::Int64 => Some(
            col.as_primitive::<Int64Type>()
                .values()
                .iter()
                .map(|&v| v as f64)
                .collect(),
        ),
        _ => None,
    }
}

fn column_as_i64(col: &ArrayRef) -> Option<Vec<i64>> {
    match col.data_type() {
        DataType::Int64 => Some(col.as_primitive::<Int64Type>().values().to_vec()),
        DataType::Float64 => col
            .as_primitive::<Float64Type>()
            .values()
            .iter()
            .map(|&v| (v.fract() == 0.0).then_some(v as i64))
            .collect(),
        _ => None,
    }
}

/// Build an `Int64` or `Float64` Arrow column.
pub(crate) fn int_column(values: Vec<i64>) -> ArrayRef {
    Arc::new(Int64Array::from(values))
}

pub(crate) fn float_column(values: Vec<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(values))
}

// ---------------------------------------------------------------------------
// TimestepRecord – one snapshot of the dump file
// ---------------------------------------------------------------------------

/// Everything extracted for one ATOMS section.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestepRecord {
    pub timestep: i64,
    pub particle_count: usize,
    pub bounds: Bounds,
    pub particles: ParticleTable,
}

impl TimestepRecord {
    pub fn summary(&self) -> TimestepSummary {
        TimestepSummary {
            timestep: self.timestep,
            particle_count: self.particle_count,
            bounds: self.bounds,
            columns: self.particles.column_names(),
        }
    }
}

/// Serialisable description of a record without the particle rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimestepSummary {
    pub timestep: i64,
    pub particle_count: usize,
    pub bounds: Bounds,
    pub columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::Field;

    fn table() -> ParticleTable {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("x", DataType::Float64, false),
            Field::new("y", DataType::Float64, false),
            Field::new("z", DataType::Float64, false),
        ]));
        ParticleTable::from_columns(
            schema,
            vec![
                int_column(vec![3, 1]),
                float_column(vec![0.5, 1.5]),
                float_column(vec![2.0, 3.0]),
                float_column(vec![-1.0, 4.25]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn columns_convert_between_int_and_float() {
        let t = table();
        assert_eq!(t.f64_column("id"), Some(vec![3.0, 1.0]));
        assert_eq!(t.i64_column("id"), Some(vec![3, 1]));
        assert_eq!(t.i64_column("y"), Some(vec![2, 3]));
        assert_eq!(t.i64_column("x"), None);
        assert_eq!(t.f64_column("missing"), None);
        assert_eq!(t.column_type("id"), Some(FieldType::Int));
        assert_eq!(t.column_type("z"), Some(FieldType::Float));
    }

    #[test]
    fn positions_and_row_major_follow_column_order() {
        let t = table();
        assert_eq!(
            t.positions(),
            Some(vec![[0.5, 2.0, -1.0], [1.5, 3.0, 4.25]])
        );
        assert_eq!(
            t.to_row_major(),
            vec![vec![3.0, 0.5, 2.0, -1.0], vec![1.0, 1.5, 3.0, 4.25]]
        );
        assert_eq!(t.column_names(), vec!["id", "x", "y", "z"]);
    }

    #[test]
    fn mismatched_column_lengths_are_rejected() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Float64, false),
            Field::new("b", DataType::Float64, false),
        ]));
        let result = ParticleTable::from_columns(
            schema,
            vec![float_column(vec![1.0]), float_column(vec![1.0, 2.0])],
        );
        assert!(result.is_err());
    }

    #[test]
    fn bounds_accessors() {
        let b = Bounds::from_pairs((0.0, 2.0), (-1.0, 1.0), (0.5, 4.5));
        assert_eq!(b.as_array(), [0.0, 2.0, -1.0, 1.0, 0.5, 4.5]);
        assert_eq!(b.y(), (-1.0, 1.0));
    }
}
