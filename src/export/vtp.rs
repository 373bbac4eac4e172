use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use super::error::ExportError;
use crate::data::model::{FieldType, ParticleTable};

// ---------------------------------------------------------------------------
// Point attributes
// ---------------------------------------------------------------------------

/// Value type of a per-point attribute array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Int,
    Float,
}

impl FromStr for AttributeType {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(AttributeType::Int),
            "float" => Ok(AttributeType::Float),
            other => Err(ExportError::UnsupportedAttributeType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl AttributeData {
    fn len(&self) -> usize {
        match self {
            AttributeData::Int(v) => v.len(),
            AttributeData::Float(v) => v.len(),
        }
    }
}

/// A named per-point array. `data` holds `components` values per point,
/// point-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAttribute {
    pub name: String,
    pub components: usize,
    pub data: AttributeData,
}

impl PointAttribute {
    pub fn int(name: impl Into<String>, components: usize, values: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            components,
            data: AttributeData::Int(values),
        }
    }

    pub fn float(name: impl Into<String>, components: usize, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            components,
            data: AttributeData::Float(values),
        }
    }

    pub fn ty(&self) -> AttributeType {
        match self.data {
            AttributeData::Int(_) => AttributeType::Int,
            AttributeData::Float(_) => AttributeType::Float,
        }
    }

    fn check(&self, points: usize) -> Result<(), ExportError> {
        if self.components == 0 || self.data.len() != points * self.components {
            return Err(ExportError::ComponentMismatch {
                name: self.name.clone(),
                len: self.data.len(),
                components: self.components,
                points,
            });
        }
        // Integer arrays are written as Int32.
        if let AttributeData::Int(values) = &self.data {
            if let Some(&value) = values.iter().find(|&&v| i32::try_from(v).is_err()) {
                return Err(ExportError::IntegerOverflow {
                    name: self.name.clone(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Positions from `x, y, z` plus one scalar attribute per remaining column.
pub fn point_cloud_from_table(
    table: &ParticleTable,
) -> Result<(Vec<[f64; 3]>, Vec<PointAttribute>), ExportError> {
    for axis in ["x", "y", "z"] {
        if !table.has_column(axis) {
            return Err(ExportError::MissingField(axis));
        }
    }
    let positions = table.positions().ok_or(ExportError::MissingField("x"))?;

    let attributes = table
        .column_names()
        .into_iter()
        .filter(|name| !matches!(name.as_str(), "x" | "y" | "z"))
        .filter_map(|name| {
            let ty = table.column_type(&name)?;
            let attr = match ty {
                FieldType::Int => PointAttribute::int(name.clone(), 1, table.i64_column(&name)?),
                FieldType::Float => {
                    PointAttribute::float(name.clone(), 1, table.f64_column(&name)?)
                }
            };
            Some(attr)
        })
        .collect();

    Ok((positions, attributes))
}

// ---------------------------------------------------------------------------
// VTK XML PolyData writer (ASCII)
// ---------------------------------------------------------------------------

const VALUES_PER_LINE: usize = 6;

/// Write a point cloud to a `.vtp` file.
pub fn write_vtp(
    path: impl AsRef<Path>,
    positions: &[[f64; 3]],
    attributes: &[PointAttribute],
) -> Result<(), ExportError> {
    let path = path.as_ref();
    log::debug!(
        "writing {} point(s) with {} attribute(s) to {}",
        positions.len(),
        attributes.len(),
        path.display()
    );
    let mut out = BufWriter::new(File::create(path)?);
    write_vtp_to(&mut out, positions, attributes)?;
    out.flush()?;
    Ok(())
}

/// Write a point cloud as ASCII VTK XML PolyData to any writer.
///
/// No cells are emitted; every attribute becomes a `PointData` array.
pub fn write_vtp_to<W: Write>(
    mut w: W,
    positions: &[[f64; 3]],
    attributes: &[PointAttribute],
) -> Result<(), ExportError> {
    for attr in attributes {
        attr.check(positions.len())?;
    }

    writeln!(w, r#"<?xml version="1.0"?>"#)?;
    writeln!(
        w,
        r#"<VTKFile type="PolyData" version="1.0" byte_order="LittleEndian" header_type="UInt64">"#
    )?;
    writeln!(w, "  <PolyData>")?;
    writeln!(
        w,
        r#"    <Piece NumberOfPoints="{}" NumberOfVerts="0" NumberOfLines="0" NumberOfStrips="0" NumberOfPolys="0">"#,
        positions.len()
    )?;

    writeln!(w, "      <PointData>")?;
    for attr in attributes {
        let vtk_type = match attr.ty() {
            AttributeType::Int => "Int32",
            AttributeType::Float => "Float64",
        };
        writeln!(
            w,
            r#"        <DataArray type="{vtk_type}" Name="{}" NumberOfComponents="{}" format="ascii">"#,
            escape_attr(&attr.name),
            attr.components
        )?;
        match &attr.data {
            AttributeData::Int(values) => write_values(&mut w, values)?,
            AttributeData::Float(values) => write_values(&mut w, values)?,
        }
        writeln!(w, "        </DataArray>")?;
    }
    writeln!(w, "      </PointData>")?;
    writeln!(w, "      <CellData>")?;
    writeln!(w, "      </CellData>")?;

    writeln!(w, "      <Points>")?;
    writeln!(
        w,
        r#"        <DataArray type="Float64" Name="Points" NumberOfComponents="3" format="ascii">"#
    )?;
    let flat: Vec<f64> = positions.iter().flatten().copied().collect();
    write_values(&mut w, &flat)?;
    writeln!(w, "        </DataArray>")?;
    writeln!(w, "      </Points>")?;

    writeln!(w, "    </Piece>")?;
    writeln!(w, "  </PolyData>")?;
    writeln!(w, "</VTKFile>")?;
    Ok(())
}

fn write_values<W: Write, T: std::fmt::Display>(w: &mut W, values: &[T]) -> std::io::Result<()> {
    for chunk in values.chunks(VALUES_PER_LINE) {
        write!(w, "          ")?;
        for (i, v) in chunk.iter().enumerate() {
            if i > 0 {
                write!(w, " ")?;
            }
            write!(w, "{v}")?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{GenericLoader, RowLoader};
    use crate::data::spec::atom_data_spec;

    fn render(positions: &[[f64; 3]], attributes: &[PointAttribute]) -> String {
        let mut buf = Vec::new();
        write_vtp_to(&mut buf, positions, attributes).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn attribute_type_rejects_unknown_names() {
        assert_eq!("int".parse::<AttributeType>().unwrap(), AttributeType::Int);
        assert_eq!(
            "float".parse::<AttributeType>().unwrap(),
            AttributeType::Float
        );
        let err = "string".parse::<AttributeType>().unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedAttributeType(ref t) if t == "string"));
    }

    #[test]
    fn writes_points_and_typed_arrays() {
        let xml = render(
            &[[0.0, 1.0, 2.0], [3.5, 4.0, 5.0]],
            &[
                PointAttribute::int("id", 1, vec![10, 20]),
                PointAttribute::float("velocity", 3, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]),
            ],
        );
        assert!(xml.contains(r#"<Piece NumberOfPoints="2""#));
        assert!(xml.contains(r#"<DataArray type="Int32" Name="id" NumberOfComponents="1" format="ascii">"#));
        assert!(xml.contains(r#"Name="velocity" NumberOfComponents="3""#));
        assert!(xml.contains("          10 20\n"));
        assert!(xml.contains("          0 1 2 3.5 4 5\n"));
        assert!(xml.trim_end().ends_with("</VTKFile>"));
    }

    #[test]
    fn mismatched_attribute_length_is_rejected() {
        let mut buf = Vec::new();
        let err = write_vtp_to(
            &mut buf,
            &[[0.0; 3], [1.0; 3]],
            &[PointAttribute::float("d", 1, vec![1.0])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ExportError::ComponentMismatch {
                len: 1,
                points: 2,
                ..
            }
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn int_attribute_outside_int32_is_rejected() {
        let mut buf = Vec::new();
        let err = write_vtp_to(
            &mut buf,
            &[[0.0; 3], [1.0; 3]],
            &[PointAttribute::int("id", 1, vec![7, i64::from(i32::MAX) + 1])],
        )
        .unwrap_err();
        match err {
            ExportError::IntegerOverflow { name, value } => {
                assert_eq!(name, "id");
                assert_eq!(value, 2_147_483_648);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn int32_extremes_are_written() {
        let xml = render(
            &[[0.0; 3], [1.0; 3]],
            &[PointAttribute::int("id", 1, vec![i64::from(i32::MIN), i64::from(i32::MAX)])],
        );
        assert!(xml.contains("          -2147483648 2147483647\n"));
    }

    #[test]
    fn point_cloud_from_generic_table() {
        let spec = atom_data_spec("ITEM: ATOMS id type x y z");
        let rows: Vec<String> = vec!["2 1 0.0 0.5 1.0".into(), "1 1 2.0 2.5 3.0".into()];
        let table = GenericLoader.load(&rows, &spec).unwrap();
        let (positions, attrs) = point_cloud_from_table(&table).unwrap();
        assert_eq!(positions, vec![[0.0, 0.5, 1.0], [2.0, 2.5, 3.0]]);
        let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "type"]);
        assert_eq!(attrs[0].ty(), AttributeType::Int);
        assert_eq!(attrs[1].ty(), AttributeType::Float);
    }

    #[test]
    fn point_cloud_needs_coordinates() {
        let spec = atom_data_spec("ITEM: ATOMS id x y");
        let table = GenericLoader.load(&["1 0 0".to_string()], &spec).unwrap();
        assert!(matches!(
            point_cloud_from_table(&table),
            Err(ExportError::MissingField("z"))
        ));
    }
}
