use thiserror::Error;

/// Failure while turning the rows of one ATOMS section into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no attribute spec provided to the {loader} loader")]
    MissingSpec { loader: &'static str },

    #[error("row {row}: expected {expected} values, found {found}")]
    TokenCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: field '{field}' value '{token}' is not a valid {expected}")]
    Number {
        row: usize,
        field: String,
        token: String,
        expected: &'static str,
    },

    #[error("section ended after {found} of {expected} rows")]
    ShortRead { expected: usize, found: usize },

    #[error("failed to read rows: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build particle table: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Failure while scanning a dump stream. Any of these aborts the whole read.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse dump data: {details} (at line {line})")]
    Parse { line: usize, details: String },

    #[error("ATOMS section at line {line} appears before any {section} section")]
    MissingSection { line: usize, section: &'static str },

    #[error("could not load data for timestep {timestep}")]
    Load {
        timestep: i64,
        #[source]
        source: LoadError,
    },
}

impl DumpError {
    pub fn parse(line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            line,
            details: details.into(),
        }
    }

    /// Timestep whose rows failed to load, if this is a load failure.
    pub fn timestep(&self) -> Option<i64> {
        match self {
            DumpError::Load { timestep, .. } => Some(*timestep),
            _ => None,
        }
    }
}
