//! Error types for reading and aggregating log data.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("log file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("{}: line {line}: column '{column}': cannot parse {value:?} as a number", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },

    #[error("{}: {reason}", .path.display())]
    Structural { path: PathBuf, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
