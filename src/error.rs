//! Error types shared by the evaluator and training utilities.

use std::path::PathBuf;

use thiserror::Error;

use crate::train::time_stat::Phase;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Batch shape mismatch in '{field}': expected {expected}, got {actual}")]
    ShapeMismatch {
        field:    &'static str,
        expected: usize,
        actual:   usize,
    },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt snapshot data: {0}")]
    CorruptData(String),

    #[error("Unsupported snapshot version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },

    #[error("Data index {index} out of range for sample list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Required metric '{0}' missing from update")]
    MissingMetric(String),

    #[error("Missing context: {0}")]
    MissingContext(&'static str),

    #[error("No data recorded yet: {0}")]
    NoData(&'static str),

    #[error("Cannot {action} while in phase {phase:?}")]
    PhaseOrder {
        action: &'static str,
        phase:  Phase,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an `io::Error` together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}
