use anyhow::{Context, Result};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use langshare::load::load_schema_table;
use langshare::AnalysisConfig;

/// One survey question as listed in the schema file.
#[derive(Serialize)]
struct Question {
    name: String,
    text: String,
}

/// Print the survey schema as YAML: one entry per question, keyed by the
/// column name respondents' answers appear under.
fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| AnalysisConfig::default().schema_path);

    let schema = load_schema_table(&path)?;
    let name_idx = schema
        .headers
        .iter()
        .position(|h| h == "qname")
        .unwrap_or(0);
    let text_idx = schema
        .headers
        .iter()
        .position(|h| h == "question")
        .unwrap_or(name_idx);

    let questions: Vec<Question> = schema
        .rows
        .iter()
        .map(|row| Question {
            name: row.get(name_idx).cloned().unwrap_or_default(),
            text: row.get(text_idx).cloned().unwrap_or_default(),
        })
        .collect();

    let yaml = serde_yaml::to_string(&questions).context("serializing questions")?;
    print!("{yaml}");
    Ok(())
}
