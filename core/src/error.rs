use crate::validate::ValidationReport;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Validation failed:\n{0}")]
    Validation(ValidationReport),

    #[error("Table '{table}' not found at {path}")]
    MissingTable { table: &'static str, path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type GenResult<T> = Result<T, GenError>;
