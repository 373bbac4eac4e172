use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::util::pretty::pretty_format_batches;

use lammps_utils::export::table::{TableFormat, write_table};
use lammps_utils::export::vtp::{point_cloud_from_table, write_vtp};
use lammps_utils::{TimestepRecord, TimestepSummary, load_dump_file};

use crate::cli::{Command, ConvertArgs, InfoArgs, ReadArgs, TableArgs};

pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Info(args) => info(args),
        Command::Vtp(args) => vtp(args),
        #[cfg(feature = "hdf5")]
        Command::H5(args) => h5(args),
        Command::Table(args) => table(args),
    }
}

fn load(read: &ReadArgs) -> Result<Vec<TimestepRecord>> {
    let records = load_dump_file(&read.input, &read.options())
        .with_context(|| format!("reading dump file {}", read.input.display()))?;
    if records.is_empty() {
        log::warn!("no timesteps in range in {}", read.input.display());
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// info
// ---------------------------------------------------------------------------

fn info(args: InfoArgs) -> Result<()> {
    let records = load(&args.read)?;

    if args.json {
        let summaries: Vec<TimestepSummary> = records.iter().map(|r| r.summary()).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&summaries).context("serialising summary")?
        );
        return Ok(());
    }

    for record in &records {
        let b = record.bounds;
        println!(
            "timestep {:>10}  particles {:>8}  box [{}, {}] x [{}, {}] x [{}, {}]",
            record.timestep,
            record.particle_count,
            b.x().0,
            b.x().1,
            b.y().0,
            b.y().1,
            b.z().0,
            b.z().1
        );
        println!("  columns: {}", record.particles.column_names().join(", "));

        if let Some(n) = args.head {
            let batch = record.particles.batch();
            let head = batch.slice(0, n.min(batch.num_rows()));
            println!(
                "{}",
                pretty_format_batches(&[head]).context("formatting particle rows")?
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Conversions: one output file per timestep
// ---------------------------------------------------------------------------

fn output_path(args: &ConvertArgs, timestep: i64, extension: &str) -> PathBuf {
    let stem = args
        .read
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dump");
    args.output.join(format!("{stem}_{timestep}.{extension}"))
}

fn prepare_output(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        bail!("output path {} is not a directory", dir.display());
    }
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}

fn vtp(args: ConvertArgs) -> Result<()> {
    let records = load(&args.read)?;
    prepare_output(&args.output)?;

    for record in &records {
        let path = output_path(&args, record.timestep, "vtp");
        let (positions, attributes) = point_cloud_from_table(&record.particles)
            .with_context(|| format!("timestep {}", record.timestep))?;
        write_vtp(&path, &positions, &attributes)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "hdf5")]
fn h5(args: ConvertArgs) -> Result<()> {
    use lammps_utils::export::h5::write_h5_mf;

    let records = load(&args.read)?;
    prepare_output(&args.output)?;

    for record in &records {
        let path = output_path(&args, record.timestep, "h5");
        write_h5_mf(&path, &record.particles)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

fn table(args: TableArgs) -> Result<()> {
    let TableArgs { convert, format } = args;
    let format: TableFormat = format.into();
    let records = load(&convert.read)?;
    prepare_output(&convert.output)?;

    for record in &records {
        let path = output_path(&convert, record.timestep, format.extension());
        write_table(&path, &record.particles, format)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}
