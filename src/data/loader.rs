use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::{DataType, Field, Schema};

use super::error::{DumpError, LoadError};
use super::filter::TimestepRange;
use super::model::{
    AttributeSpec, Bounds, FieldType, ParticleTable, TimestepRecord, float_column, int_column,
};
use super::spec::{atom_data_spec, normalize};

// ---------------------------------------------------------------------------
// Row loading strategies
// ---------------------------------------------------------------------------

/// Turns the raw rows of one ATOMS section into a particle table.
///
/// The reader hands over exactly `particle_count` lines together with the
/// spec resolved from the section header; implementations decide how much of
/// the spec they honour.
pub trait RowLoader {
    /// Short name used in error messages and logs.
    fn name(&self) -> &'static str;

    fn load(&self, rows: &[String], spec: &AttributeSpec) -> Result<ParticleTable, LoadError>;
}

/// Fixed-layout loader for `id x y z diameter connectivity` dumps.
///
/// Rows are sorted by ascending id and the id column is dropped, leaving
/// `x, y, z, diameter, connectivity` as `Float64` columns. The header spec
/// is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnDiamLoader;

const CONN_DIAM_FIELDS: [&str; 6] = ["id", "x", "y", "z", "diameter", "connectivity"];

impl RowLoader for ConnDiamLoader {
    fn name(&self) -> &'static str {
        "conn-diam"
    }

    fn load(&self, rows: &[String], _spec: &AttributeSpec) -> Result<ParticleTable, LoadError> {
        let mut parsed: Vec<[f64; 6]> = Vec::with_capacity(rows.len());

        for (row, line) in rows.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != CONN_DIAM_FIELDS.len() {
                return Err(LoadError::TokenCount {
                    row,
                    expected: CONN_DIAM_FIELDS.len(),
                    found: tokens.len(),
                });
            }

            let mut values = [0.0; 6];
            for (slot, (tok, field)) in values
                .iter_mut()
                .zip(tokens.iter().zip(CONN_DIAM_FIELDS))
            {
                *slot = parse_float(tok, row, field)?;
            }
            parsed.push(values);
        }

        // Stable, so duplicate ids keep file order.
        parsed.sort_by(|a, b| a[0].total_cmp(&b[0]));

        let fields: Vec<Field> = CONN_DIAM_FIELDS[1..]
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, false))
            .collect();
        let columns: Vec<ArrayRef> = (1..CONN_DIAM_FIELDS.len())
            .map(|c| float_column(parsed.iter().map(|row| row[c]).collect()))
            .collect();

        Ok(ParticleTable::from_columns(
            Arc::new(Schema::new(fields)),
            columns,
        )?)
    }
}

/// Spec-driven loader: one column per header field, typed per the spec,
/// rows kept in file order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericLoader;

enum ColumnBuilder {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl ColumnBuilder {
    fn with_capacity(ty: FieldType, n: usize) -> Self {
        match ty {
            FieldType::Int => ColumnBuilder::Int(Vec::with_capacity(n)),
            FieldType::Float => ColumnBuilder::Float(Vec::with_capacity(n)),
        }
    }

    fn push(&mut self, token: &str, row: usize, field: &str) -> Result<(), LoadError> {
        match self {
            ColumnBuilder::Int(v) => v.push(parse_int(token, row, field)?),
            ColumnBuilder::Float(v) => v.push(parse_float(token, row, field)?),
        }
        Ok(())
    }

    fn finish(self) -> ArrayRef {
        match self {
            ColumnBuilder::Int(v) => int_column(v),
            ColumnBuilder::Float(v) => float_column(v),
        }
    }
}

impl RowLoader for GenericLoader {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn load(&self, rows: &[String], spec: &AttributeSpec) -> Result<ParticleTable, LoadError> {
        if spec.is_empty() {
            return Err(LoadError::MissingSpec {
                loader: self.name(),
            });
        }

        let mut builders: Vec<ColumnBuilder> = spec
            .iter()
            .map(|f| ColumnBuilder::with_capacity(f.ty, rows.len()))
            .collect();

        for (row, line) in rows.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != spec.len() {
                return Err(LoadError::TokenCount {
                    row,
                    expected: spec.len(),
                    found: tokens.len(),
                });
            }
            for ((builder, tok), field) in builders.iter_mut().zip(&tokens).zip(spec.iter()) {
                builder.push(tok, row, &field.name)?;
            }
        }

        let fields: Vec<Field> = spec
            .iter()
            .map(|f| Field::new(f.name.as_str(), f.ty.data_type(), false))
            .collect();
        let columns: Vec<ArrayRef> = builders.into_iter().map(ColumnBuilder::finish).collect();

        Ok(ParticleTable::from_columns(
            Arc::new(Schema::new(fields)),
            columns,
        )?)
    }
}

fn parse_float(token: &str, row: usize, field: &str) -> Result<f64, LoadError> {
    token.parse::<f64>().map_err(|_| LoadError::Number {
        row,
        field: field.to_string(),
        token: token.to_string(),
        expected: "float",
    })
}

fn parse_int(token: &str, row: usize, field: &str) -> Result<i64, LoadError> {
    token.parse::<i64>().map_err(|_| LoadError::Number {
        row,
        field: field.to_string(),
        token: token.to_string(),
        expected: "integer",
    })
}

/// Named choice of row loader, for configuration and the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoaderKind {
    #[default]
    Generic,
    ConnDiam,
}

impl LoaderKind {
    pub fn loader(self) -> &'static dyn RowLoader {
        match self {
            LoaderKind::Generic => &GenericLoader,
            LoaderKind::ConnDiam => &ConnDiamLoader,
        }
    }
}

impl FromStr for LoaderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(LoaderKind::Generic),
            "conn-diam" | "conn_diam" | "conndiam" => Ok(LoaderKind::ConnDiam),
            other => Err(format!(
                "unknown loader '{other}' (expected 'generic' or 'conn-diam')"
            )),
        }
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.loader().name())
    }
}

/// Everything a read needs besides the stream itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub loader: LoaderKind,
    pub range: TimestepRange,
}

// ---------------------------------------------------------------------------
// Dump stream reader
// ---------------------------------------------------------------------------

/// Section markers recognised in a normalised line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Timestep,
    NumberOfAtoms,
    BoxBounds,
    Atoms,
    Other,
}

impl Section {
    fn detect(line: &str) -> Self {
        if line.contains("item: timestep") {
            Section::Timestep
        } else if line.contains("item: number of atoms") {
            Section::NumberOfAtoms
        } else if line.contains("item: box bounds") {
            Section::BoxBounds
        } else if line.contains("item: atoms") {
            Section::Atoms
        } else {
            Section::Other
        }
    }
}

/// Line source that remembers 1-based line numbers and can hand one line
/// back to the scanner.
struct LineCursor<R> {
    inner: R,
    line_no: usize,
    buf: String,
    pending: Option<(usize, String)>,
}

impl<R: BufRead> LineCursor<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            line_no: 0,
            buf: String::new(),
            pending: None,
        }
    }

    fn next_line(&mut self) -> std::io::Result<Option<(usize, String)>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        self.buf.clear();
        if self.inner.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some((self.line_no, self.buf.clone())))
    }

    /// Next line, which must exist because a marker announced it.
    fn expect_line(&mut self, after: &str) -> Result<(usize, String), DumpError> {
        self.next_line()?.ok_or_else(|| {
            DumpError::parse(
                self.line_no + 1,
                format!("unexpected end of file after ITEM: {after}"),
            )
        })
    }

    /// Read up to `n` lines; fewer are returned only at end of stream.
    fn take_lines(&mut self, n: usize) -> std::io::Result<Vec<String>> {
        // The count comes from the file; don't trust it for the allocation.
        let mut rows = Vec::with_capacity(n.min(1 << 16));
        while rows.len() < n {
            match self.next_line()? {
                Some((_, line)) => rows.push(line),
                None => break,
            }
        }
        Ok(rows)
    }

    /// Discard up to `n` row lines. A marker line ends the skip early and is
    /// left for the scanner; returns the number of rows discarded.
    fn skip_rows(&mut self, n: usize) -> std::io::Result<usize> {
        let mut skipped = 0;
        while skipped < n {
            match self.next_line()? {
                Some((line_no, line)) if normalize(&line).contains("item:") => {
                    self.pending = Some((line_no, line));
                    break;
                }
                Some(_) => skipped += 1,
                None => break,
            }
        }
        Ok(skipped)
    }
}

/// Scalar state carried between sections. Values persist until the next
/// section of the same kind overwrites them.
#[derive(Debug, Default)]
struct ScanState {
    timestep: Option<i64>,
    particle_count: Option<usize>,
    bounds: Option<Bounds>,
}

/// Streaming reader yielding one [`TimestepRecord`] per ATOMS section inside
/// the configured range.
///
/// Iteration stops at end of stream, at the first timestep past the range's
/// upper bound, or after the first error (which is yielded once).
pub struct DumpReader<'l, R> {
    lines: LineCursor<R>,
    loader: &'l dyn RowLoader,
    range: TimestepRange,
    state: ScanState,
    done: bool,
}

impl<'l, R: BufRead> DumpReader<'l, R> {
    pub fn new(reader: R, loader: &'l dyn RowLoader, range: TimestepRange) -> Self {
        Self {
            lines: LineCursor::new(reader),
            loader,
            range,
            state: ScanState::default(),
            done: false,
        }
    }

    fn advance(&mut self) -> Result<Option<TimestepRecord>, DumpError> {
        while let Some((line_no, raw)) = self.lines.next_line()? {
            let line = normalize(&raw);
            match Section::detect(&line) {
                Section::Timestep => {
                    let timestep = self.read_timestep()?;
                    if self.range.is_past(timestep) {
                        log::debug!("timestep {timestep} is past the requested range, stopping");
                        return Ok(None);
                    }
                    log::debug!("line {line_no}: timestep {timestep}");
                    self.state.timestep = Some(timestep);
                }
                Section::NumberOfAtoms => {
                    let count = self.read_particle_count()?;
                    log::debug!("line {line_no}: {count} atoms");
                    self.state.particle_count = Some(count);
                }
                Section::BoxBounds => {
                    let bounds = self.read_bounds()?;
                    log::debug!("line {line_no}: box bounds {:?}", bounds.as_array());
                    self.state.bounds = Some(bounds);
                }
                Section::Atoms => {
                    if let Some(record) = self.read_atoms(line_no, &line)? {
                        return Ok(Some(record));
                    }
                }
                Section::Other => {}
            }
        }
        Ok(None)
    }

    fn read_timestep(&mut self) -> Result<i64, DumpError> {
        let (n, raw) = self.lines.expect_line("TIMESTEP")?;
        let value = normalize(&raw);
        value
            .parse::<i64>()
            .map_err(|_| DumpError::parse(n, format!("invalid timestep '{value}'")))
    }

    fn read_particle_count(&mut self) -> Result<usize, DumpError> {
        let (n, raw) = self.lines.expect_line("NUMBER OF ATOMS")?;
        let value = normalize(&raw);
        value
            .parse::<usize>()
            .map_err(|_| DumpError::parse(n, format!("invalid number of atoms '{value}'")))
    }

    fn read_bounds(&mut self) -> Result<Bounds, DumpError> {
        let mut pairs = [(0.0, 0.0); 3];
        for (axis, pair) in ["x", "y", "z"].iter().zip(pairs.iter_mut()) {
            let (n, raw) = self.lines.expect_line("BOX BOUNDS")?;
            let tokens: Vec<&str> = raw.split_whitespace().collect();
            if tokens.len() < 2 {
                return Err(DumpError::parse(
                    n,
                    format!("expected {axis}lo {axis}hi pair in box bounds"),
                ));
            }
            if tokens.len() > 2 {
                log::warn!(
                    "line {n}: ignoring {} extra value(s) after {axis} bounds",
                    tokens.len() - 2
                );
            }
            let parse = |tok: &str| {
                tok.parse::<f64>().map_err(|_| {
                    DumpError::parse(n, format!("invalid {axis} bound '{tok}' in box bounds"))
                })
            };
            *pair = (parse(tokens[0])?, parse(tokens[1])?);
        }
        Ok(Bounds::from_pairs(pairs[0], pairs[1], pairs[2]))
    }

    fn read_atoms(
        &mut self,
        line_no: usize,
        header: &str,
    ) -> Result<Option<TimestepRecord>, DumpError> {
        let missing = |section: &'static str| DumpError::MissingSection {
            line: line_no,
            section,
        };
        let timestep = self.state.timestep.ok_or_else(|| missing("TIMESTEP"))?;
        let particle_count = self
            .state
            .particle_count
            .ok_or_else(|| missing("NUMBER OF ATOMS"))?;

        if self.range.is_before(timestep) {
            let skipped = self.lines.skip_rows(particle_count)?;
            if skipped < particle_count {
                log::warn!(
                    "timestep {timestep} declares {particle_count} rows but only {skipped} precede the next section"
                );
            }
            log::debug!("skipped {skipped} rows of timestep {timestep}");
            return Ok(None);
        }

        let bounds = self.state.bounds.ok_or_else(|| missing("BOX BOUNDS"))?;
        let spec = atom_data_spec(header);
        log::debug!(
            "loading {particle_count} rows for timestep {timestep} with {} loader",
            self.loader.name()
        );

        let particles = self
            .load_rows(particle_count, &spec)
            .map_err(|source| DumpError::Load { timestep, source })?;

        Ok(Some(TimestepRecord {
            timestep,
            particle_count,
            bounds,
            particles,
        }))
    }

    fn load_rows(&mut self, n: usize, spec: &AttributeSpec) -> Result<ParticleTable, LoadError> {
        let rows = self.lines.take_lines(n)?;
        if rows.len() < n {
            return Err(LoadError::ShortRead {
                expected: n,
                found: rows.len(),
            });
        }
        self.loader.load(&rows, spec)
    }
}

impl<R: BufRead> Iterator for DumpReader<'_, R> {
    type Item = Result<TimestepRecord, DumpError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read every in-range timestep from a dump stream.
///
/// All or nothing: the first malformed section fails the whole call and no
/// records are returned.
pub fn read_dump<R: BufRead>(
    reader: R,
    loader: &dyn RowLoader,
    range: TimestepRange,
) -> Result<Vec<TimestepRecord>, DumpError> {
    let records = DumpReader::new(reader, loader, range).collect::<Result<Vec<_>, _>>()?;
    log::info!("loaded {} timestep(s)", records.len());
    Ok(records)
}

/// Open `path` and read it with [`read_dump`].
pub fn load_dump_file(
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> Result<Vec<TimestepRecord>, DumpError> {
    let path = path.as_ref();
    log::debug!("opening dump file {}", path.display());
    let file = File::open(path)?;
    read_dump(BufReader::new(file), options.loader.loader(), options.range)
}
