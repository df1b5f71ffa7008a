//! Per-country share of survey respondents who report working with a target
//! language, rendered as a 2×2 chart grid.

pub mod config;
pub mod error;
pub mod export;
pub mod load;
pub mod pipeline;
pub mod process;
pub mod render;

pub use config::{AnalysisConfig, Layout, MatchMode};
pub use error::AnalysisError;
pub use pipeline::{analyze, run, RunReport};
