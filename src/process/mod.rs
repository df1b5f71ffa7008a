// src/process/mod.rs
pub mod aggregate;
pub mod chunk;
pub mod clean;
pub mod postprocess;

use serde::Serialize;

pub use aggregate::{aggregate, CountryShare};
pub use chunk::{partition, top_n, GRID_CHUNKS};
pub use clean::select_and_clean;
pub use postprocess::{percentage_stats, postprocess, PercentageStats};

/// One cleaned survey answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseRow {
    pub country: String,
    pub languages_used: String,
}

impl ResponseRow {
    pub fn new(country: impl Into<String>, languages_used: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            languages_used: languages_used.into(),
        }
    }
}

/// Final per-country record. `label` is the truncated display name; the
/// untruncated `country` stays alongside it since labels may collide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryPercentage {
    pub country: String,
    pub label: String,
    pub percentage: f64,
}
