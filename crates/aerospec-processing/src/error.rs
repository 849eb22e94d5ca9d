use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parser error: {0}")]
    Parser(#[from] aerospec_parser::ParserError),

    #[error("roster error: {0}")]
    Roster(#[from] aerospec_core::RosterError),

    #[error("unsupported resampling resolution '{0}'; expected 'hour', '10min', or 'minute'")]
    InvalidResolution(String),

    #[error("processing stage failed: {0}")]
    Stage(String),
}
