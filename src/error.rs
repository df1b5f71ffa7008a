// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions of a run. Raised through `anyhow` so callers can
/// `downcast_ref::<AnalysisError>()` when they need to tell them apart.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// An input CSV does not exist.
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// A required column is absent from the header row.
    #[error("column `{column}` missing from {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// Nothing survived cleaning and filtering.
    #[error("no data to plot: {0}")]
    NoData(String),

    /// Summary export was asked for an extension we cannot write.
    #[error("unsupported export format for {}", path.display())]
    UnsupportedExport { path: PathBuf },
}
