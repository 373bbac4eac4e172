//! HDF5 export in the flat "MF" layout: one top-level dataset per field.

use std::path::Path;

use super::error::ExportError;
use crate::data::model::ParticleTable;

/// Source column → dataset name for the float fields that are always written.
const FLOAT_DATASETS: [(&str, &str); 4] = [
    ("x", "Xpos"),
    ("y", "Ypos"),
    ("z", "Zpos"),
    ("diameter", "Diameter"),
];

/// Velocity datasets, written only when the table carries `vx`.
const VELOCITY_DATASETS: [(&str, &str); 3] = [("vx", "Vx"), ("vy", "Vy"), ("vz", "Vz")];

/// Write `id`, positions, diameter and (if present) velocities of one
/// timestep to a new HDF5 file, truncating any existing file.
pub fn write_h5_mf(path: impl AsRef<Path>, table: &ParticleTable) -> Result<(), ExportError> {
    let path = path.as_ref();
    let ids = table.i64_column("id").ok_or(ExportError::MissingField("id"))?;

    let mut datasets: Vec<(&str, Vec<f64>)> = Vec::with_capacity(7);
    for (field, dataset) in FLOAT_DATASETS {
        let values = table.f64_column(field).ok_or(ExportError::MissingField(field))?;
        datasets.push((dataset, values));
    }
    if table.has_column("vx") {
        for (field, dataset) in VELOCITY_DATASETS {
            let values = table.f64_column(field).ok_or(ExportError::MissingField(field))?;
            datasets.push((dataset, values));
        }
    }

    log::debug!(
        "writing {} particle(s) and {} dataset(s) to {}",
        ids.len(),
        datasets.len() + 1,
        path.display()
    );

    let file = hdf5::File::create(path)?;
    file.new_dataset_builder()
        .with_data(ids.as_slice())
        .create("Number")?;
    for (name, values) in &datasets {
        file.new_dataset_builder()
            .with_data(values.as_slice())
            .create(*name)?;
    }
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{GenericLoader, RowLoader};
    use crate::data::spec::atom_data_spec;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("lammps_utils_{}_{name}", std::process::id()))
    }

    #[test]
    fn writes_renamed_datasets() {
        let spec = atom_data_spec("ITEM: ATOMS id x y z diameter vx vy vz");
        let rows = vec![
            "1 0.0 0.1 0.2 1.0 -1 0 1".to_string(),
            "2 1.0 1.1 1.2 2.0 3 4 5".to_string(),
        ];
        let table = GenericLoader.load(&rows, &spec).unwrap();
        let path = temp_path("velocities.h5");
        write_h5_mf(&path, &table).unwrap();

        let file = hdf5::File::open(&path).unwrap();
        let number: Vec<i64> = file.dataset("Number").unwrap().read_raw().unwrap();
        assert_eq!(number, vec![1, 2]);
        let diameter: Vec<f64> = file.dataset("Diameter").unwrap().read_raw().unwrap();
        assert_eq!(diameter, vec![1.0, 2.0]);
        let vz: Vec<f64> = file.dataset("Vz").unwrap().read_raw().unwrap();
        assert_eq!(vz, vec![1.0, 5.0]);
        drop(file);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_diameter_is_reported() {
        let spec = atom_data_spec("ITEM: ATOMS id x y z");
        let table = GenericLoader
            .load(&["1 0 0 0".to_string()], &spec)
            .unwrap();
        let err = write_h5_mf(temp_path("missing.h5"), &table).unwrap_err();
        assert!(matches!(err, ExportError::MissingField("diameter")));
    }
}
