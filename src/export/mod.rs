/// Writers that turn particle tables into files for other tools.
///
/// * `vtp`   – VTK XML PolyData point clouds (ASCII)
/// * `h5`    – HDF5 "MF" datasets (requires the `hdf5` feature)
/// * `table` – Parquet / CSV dumps of a whole table
pub mod error;
#[cfg(feature = "hdf5")]
pub mod h5;
pub mod table;
pub mod vtp;
