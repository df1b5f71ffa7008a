use serde::Serialize;
use tracing::{debug, info};

use super::{CountryPercentage, CountryShare};
use crate::config::PostprocessConfig;

/// First `n` characters of `country`.
pub fn truncate_label(country: &str, n: usize) -> String {
    country.chars().take(n).collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Non-finite values become `0.0`; everything else is rounded to `precision`
/// decimal places. A non-zero value that would round to zero keeps
/// `precision` significant digits instead, so only a real zero is `0.0`.
pub fn coerce_percentage(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = round_to(value, precision as i32);
    if rounded != 0.0 || value == 0.0 {
        return rounded;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let small = round_to(value, precision as i32 - 1 - magnitude);
    if small.is_finite() && small != 0.0 {
        small
    } else {
        value
    }
}

/// Stable sort, highest percentage first.
pub fn sort_descending(records: &mut [CountryPercentage]) {
    records.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
}

/// Population z-scores of `values`. `None` for an empty or constant input.
pub fn z_scores(values: &[f64]) -> Option<Vec<f64>> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        return None;
    }
    Some(values.iter().map(|v| (v - mean) / std).collect())
}

/// Keep records with `-threshold < z < threshold`, z taken over the whole
/// cross-country distribution. A constant distribution is kept whole.
pub fn filter_outliers(records: Vec<CountryPercentage>, threshold: f64) -> Vec<CountryPercentage> {
    let values: Vec<f64> = records.iter().map(|r| r.percentage).collect();
    let Some(z) = z_scores(&values) else {
        return records;
    };

    let before = records.len();
    let kept: Vec<CountryPercentage> = records
        .into_iter()
        .zip(z)
        .filter(|(_, z)| z.abs() < threshold)
        .map(|(r, _)| r)
        .collect();
    debug!(removed = before - kept.len(), threshold, "z-score filter");
    kept
}

/// Truncate labels, coerce, sort descending, optionally reject outliers and
/// drop zero percentages, in that order.
#[tracing::instrument(level = "info", skip_all, fields(countries = shares.len()))]
pub fn postprocess(shares: &[CountryShare], cfg: &PostprocessConfig) -> Vec<CountryPercentage> {
    let mut records: Vec<CountryPercentage> = shares
        .iter()
        .map(|s| CountryPercentage {
            country: s.country.clone(),
            label: truncate_label(&s.country, cfg.label_length),
            percentage: coerce_percentage(s.percentage, cfg.precision),
        })
        .collect();

    sort_descending(&mut records);

    if let Some(threshold) = cfg.outlier_z {
        records = filter_outliers(records, threshold);
    }

    let before = records.len();
    records.retain(|r| r.percentage != 0.0);
    debug!(removed = before - records.len(), "dropped zero percentages");

    info!(records = records.len(), "post-processed");
    records
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentageStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

pub fn percentage_stats(records: &[CountryPercentage]) -> Option<PercentageStats> {
    if records.is_empty() {
        return None;
    }
    let n = records.len() as f64;
    let mean = records.iter().map(|r| r.percentage).sum::<f64>() / n;
    let var = records
        .iter()
        .map(|r| (r.percentage - mean).powi(2))
        .sum::<f64>()
        / n;
    let min = records.iter().map(|r| r.percentage).fold(f64::INFINITY, f64::min);
    let max = records
        .iter()
        .map(|r| r.percentage)
        .fold(f64::NEG_INFINITY, f64::max);
    Some(PercentageStats {
        count: records.len(),
        mean,
        std: var.sqrt(),
        min,
        max,
    })
}
