use anyhow::Result;
use clap::Parser;
use langshare::{pipeline, AnalysisConfig, Layout};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Per-country share of survey respondents using a language, as a chart grid"
)]
struct Args {
    /// YAML config; command-line flags override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Chart layout and post-processing preset.
    #[arg(long, value_enum)]
    variant: Option<Layout>,
    #[arg(long)]
    schema: Option<PathBuf>,
    #[arg(long)]
    survey: Option<PathBuf>,
    /// Image path; `.svg` writes SVG, anything else a bitmap.
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    target_language: Option<String>,
    /// Also write the final records as `.json` or `.parquet`.
    #[arg(long)]
    export: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<AnalysisConfig> {
        let mut cfg = match &self.config {
            Some(path) => AnalysisConfig::from_yaml_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(layout) = self.variant {
            cfg.apply_layout(layout);
        }
        if let Some(p) = self.schema {
            cfg.schema_path = p;
        }
        if let Some(p) = self.survey {
            cfg.survey_path = p;
        }
        if let Some(p) = self.output {
            cfg.output_path = p;
        }
        if let Some(lang) = self.target_language {
            cfg.target_language = lang;
        }
        if let Some(p) = self.export {
            cfg.export_path = Some(p);
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) config ───────────────────────────────────────────────────
    let cfg = Args::parse().into_config()?;
    info!(
        target = %cfg.target_language,
        layout = ?cfg.render.layout,
        survey = %cfg.survey_path.display(),
        "configured"
    );

    // ─── 3) run ──────────────────────────────────────────────────────
    let report = pipeline::run(&cfg)?;
    info!(
        countries = report.records.len(),
        image = %report.image_path.display(),
        "all done"
    );
    Ok(())
}
