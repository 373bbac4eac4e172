use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use lammps_utils::export::table::TableFormat;
use lammps_utils::{LoaderKind, ReadOptions, TimestepRange};

#[derive(Parser)]
#[command(
    name = "lammps-utils",
    about = "Read LAMMPS dump files and convert particle data",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarise the timesteps of a dump file
    Info(InfoArgs),

    /// Write one VTK PolyData point cloud (.vtp) per timestep
    Vtp(ConvertArgs),

    /// Write one HDF5 file per timestep (Number, Xpos, ..., Diameter)
    #[cfg(feature = "hdf5")]
    H5(ConvertArgs),

    /// Write one Parquet or CSV table per timestep
    Table(TableArgs),
}

/// Options controlling how the dump file is read.
#[derive(Args)]
pub struct ReadArgs {
    /// LAMMPS dump file
    #[arg(value_name = "DUMP")]
    pub input: PathBuf,

    /// Row loader: `generic` (columns from the ATOMS header) or `conn-diam`
    #[arg(short, long, value_name = "LOADER", default_value = "generic")]
    pub loader: LoaderKind,

    /// First timestep to keep (inclusive)
    #[arg(long, value_name = "TS", allow_hyphen_values = true)]
    pub start: Option<i64>,

    /// Last timestep to keep (inclusive); reading stops past it
    #[arg(long, value_name = "TS", allow_hyphen_values = true)]
    pub stop: Option<i64>,
}

impl ReadArgs {
    pub fn options(&self) -> ReadOptions {
        ReadOptions {
            loader: self.loader,
            range: TimestepRange::new(self.start, self.stop),
        }
    }
}

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub read: ReadArgs,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Also print the first N particle rows of each timestep
    #[arg(long, value_name = "N")]
    pub head: Option<usize>,
}

#[derive(Args)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub read: ReadArgs,

    /// Output directory (created if missing)
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct TableArgs {
    #[command(flatten)]
    pub convert: ConvertArgs,

    /// Table format
    #[arg(short, long, value_name = "FORMAT", default_value = "parquet")]
    pub format: FormatArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Parquet,
    Csv,
}

impl From<FormatArg> for TableFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Parquet => TableFormat::Parquet,
            FormatArg::Csv => TableFormat::Csv,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
