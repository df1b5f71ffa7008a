// src/pipeline.rs

use anyhow::{Context, Result};
use std::{path::PathBuf, time::Instant};
use tracing::info;

use crate::{
    config::AnalysisConfig,
    export::export_summary,
    load::{load_schema_table, load_survey_table},
    process::{aggregate, percentage_stats, postprocess, select_and_clean, CountryPercentage},
    render::{plan_grid, render_grid, GridPlan},
};

/// Outcome of one run.
#[derive(Debug)]
pub struct RunReport {
    pub records: Vec<CountryPercentage>,
    pub plan: GridPlan,
    pub image_path: PathBuf,
    pub export_path: Option<PathBuf>,
}

/// Load, clean, aggregate and post-process without drawing anything.
/// Returns the final ordered records and the grid plan.
pub fn analyze(cfg: &AnalysisConfig) -> Result<(Vec<CountryPercentage>, GridPlan)> {
    // ─── 1) load ──────────────────────────────────────────────────────
    let schema = load_schema_table(&cfg.schema_path).context("loading schema table")?;
    info!(
        questions = schema.rows.len(),
        "schema table loaded (not used by the computation)"
    );
    let survey = load_survey_table(&cfg.survey_path, &cfg.columns, &cfg.null_values)
        .context("loading survey table")?;

    // ─── 2) select & clean ────────────────────────────────────────────
    let rows = select_and_clean(&survey, cfg.drop_duplicates)?;

    // ─── 3) aggregate ─────────────────────────────────────────────────
    let shares = aggregate(&rows, &cfg.target_language, cfg.match_mode);

    // ─── 4) post-process ──────────────────────────────────────────────
    let records = postprocess(&shares, &cfg.postprocess);
    if let Some(stats) = percentage_stats(&records) {
        info!(
            count = stats.count,
            mean = stats.mean,
            std = stats.std,
            min = stats.min,
            max = stats.max,
            "percentage distribution"
        );
    }

    let plan = plan_grid(&records, &cfg.render, &cfg.target_language)?;
    Ok((records, plan))
}

/// Full run: [`analyze`], then render the grid and write the optional export.
#[tracing::instrument(level = "info", skip_all, fields(survey = %cfg.survey_path.display()))]
pub fn run(cfg: &AnalysisConfig) -> Result<RunReport> {
    let start = Instant::now();
    let (records, plan) = analyze(cfg)?;

    // ─── 5) render ────────────────────────────────────────────────────
    render_grid(
        &plan,
        &cfg.output_path,
        (cfg.render.width, cfg.render.height),
    )
    .context("rendering chart grid")?;

    if let Some(path) = &cfg.export_path {
        export_summary(&records, path).context("exporting summary")?;
    }

    info!(elapsed = ?start.elapsed(), "run complete");
    Ok(RunReport {
        records,
        plan,
        image_path: cfg.output_path.clone(),
        export_path: cfg.export_path.clone(),
    })
}
