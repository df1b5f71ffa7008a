use std::collections::BTreeMap;
use tracing::{debug, info};

use super::ResponseRow;
use crate::config::MatchMode;

/// Per-country tally of respondents whose language field matched the target.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShare {
    pub country: String,
    pub matched: usize,
    pub total: usize,
    /// `100 * matched / total`, in `[0, 100]`.
    pub percentage: f64,
}

pub fn matches(languages_used: &str, target: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exact => languages_used == target,
        MatchMode::Token => languages_used.split(';').any(|t| t.trim() == target),
    }
}

/// Group `rows` by country and compute the share matching `target`.
/// Output is ordered by country name.
#[tracing::instrument(level = "info", skip(rows), fields(rows = rows.len()))]
pub fn aggregate(rows: &[ResponseRow], target: &str, mode: MatchMode) -> Vec<CountryShare> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in rows {
        let (matched, total) = groups.entry(row.country.as_str()).or_default();
        *total += 1;
        if matches(&row.languages_used, target, mode) {
            *matched += 1;
        }
    }

    let shares: Vec<CountryShare> = groups
        .into_iter()
        .map(|(country, (matched, total))| CountryShare {
            country: country.to_string(),
            matched,
            total,
            percentage: 100.0 * matched as f64 / total as f64,
        })
        .collect();

    let with_matches = shares.iter().filter(|s| s.matched > 0).count();
    debug!(with_matches, "countries with at least one match");
    info!(countries = shares.len(), "aggregated shares");
    shares
}
