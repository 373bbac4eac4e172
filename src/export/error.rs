use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("attribute data type '{0}' is not supported (expected 'int' or 'float')")]
    UnsupportedAttributeType(String),

    #[error("particle table has no '{0}' column")]
    MissingField(&'static str),

    #[error("attribute '{name}' has {len} values, expected {points} point(s) x {components} component(s)")]
    ComponentMismatch {
        name: String,
        len: usize,
        components: usize,
        points: usize,
    },

    #[error("attribute '{name}' value {value} does not fit in a 32-bit integer")]
    IntegerOverflow { name: String, value: i64 },

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "hdf5")]
    #[error("hdf5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}
