/// Data layer: dump parsing and the in-memory particle model.
///
/// Architecture:
/// ```text
///  LAMMPS dump file
///        │
///        ▼
///   ┌──────────┐    ┌──────────┐
///   │  loader   │──▶│   spec    │  ITEM: ATOMS header → AttributeSpec
///   └──────────┘    └──────────┘
///        │  RowLoader (generic | conn-diam), TimestepRange from `filter`
///        ▼
///   ┌───────────────┐
///   │ TimestepRecord │  timestep, particle count, bounds, ParticleTable
///   └───────────────┘
/// ```
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod spec;
