use thiserror::Error;

/// Errors raised by the dataset, neighbour and cohort computations.
#[derive(Error, Debug)]
pub enum GutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Empty cohort: {0}")]
    EmptyCohort(String),

    #[error("No metadata for sample '{0}'")]
    MissingMetadata(String),

    #[error("Malformed value '{value}' in column '{column}' for sample '{sample}'")]
    MalformedField {
        column: String,
        value: String,
        sample: String,
    },

    #[error("Sample '{0}' appears more than once")]
    DuplicateSample(String),

    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },
}

pub type Result<T> = std::result::Result<T, GutError>;
