//! Utilities for reading LAMMPS dump files and converting the particle data
//! they contain.
//!
//! A dump file is scanned once, top to bottom. Every `ITEM: ATOMS` section
//! whose timestep falls inside the requested [`TimestepRange`] becomes a
//! [`TimestepRecord`] holding the timestep, particle count, box bounds and an
//! Arrow-backed [`ParticleTable`]. How the rows of a section are interpreted
//! is decided by a [`RowLoader`]:
//!
//! - [`GenericLoader`] builds one typed column per field named in the
//!   section header (`id` and `connectivity` as integers, everything else as
//!   floats).
//! - [`ConnDiamLoader`] reads the fixed `id x y z diameter connectivity`
//!   layout, sorts by id and drops the id column.
//!
//! ```
//! use std::io::Cursor;
//! use lammps_utils::{read_dump, GenericLoader, TimestepRange};
//!
//! let dump = "\
//! ITEM: TIMESTEP
//! 1000
//! ITEM: NUMBER OF ATOMS
//! 2
//! ITEM: BOX BOUNDS pp pp pp
//! 0 10
//! 0 10
//! 0 10
//! ITEM: ATOMS id type x y z
//! 1 1 0.5 0.5 0.5
//! 2 1 1.5 1.5 1.5
//! ";
//!
//! let records = read_dump(Cursor::new(dump), &GenericLoader, TimestepRange::all())?;
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].timestep, 1000);
//! assert_eq!(records[0].particles.column_names(), ["id", "type", "x", "y", "z"]);
//! # Ok::<(), lammps_utils::DumpError>(())
//! ```
//!
//! The [`export`] module writes records out again: VTK XML point clouds,
//! HDF5 datasets (feature `hdf5`), and Parquet or CSV tables.

pub mod data;
pub mod export;

pub use data::error::{DumpError, LoadError};
pub use data::filter::TimestepRange;
pub use data::loader::{
    ConnDiamLoader, DumpReader, GenericLoader, LoaderKind, ReadOptions, RowLoader, load_dump_file,
    read_dump,
};
pub use data::model::{
    AttributeSpec, Bounds, FieldSpec, FieldType, ParticleTable, TimestepRecord, TimestepSummary,
};
pub use data::spec::atom_data_spec;
pub use export::error::ExportError;
