use anyhow::{Context, Result};
use arrow::{
    array::{Array, StringArray},
    compute::{and, filter, is_not_null},
};
use std::collections::HashSet;
use tracing::{debug, info};

use super::ResponseRow;
use crate::load::SurveyTable;

/// Project the survey to `{country, languages_used}`, drop rows with a null in
/// either field and, when `drop_duplicates` is set, collapse identical
/// `(country, languages_used)` pairs to their first occurrence.
///
/// Duplicates are judged after projection, so two respondents from the same
/// country with the same raw language string count once.
#[tracing::instrument(level = "info", skip_all, fields(rows = table.num_rows()))]
pub fn select_and_clean(table: &SurveyTable, drop_duplicates: bool) -> Result<Vec<ResponseRow>> {
    let countries = table.countries()?;
    let languages = table.languages()?;

    let mask = and(&is_not_null(countries)?, &is_not_null(languages)?)
        .context("building non-null mask")?;
    let countries = filter(countries, &mask).context("filtering countries")?;
    let languages = filter(languages, &mask).context("filtering languages")?;
    let countries = countries
        .as_any()
        .downcast_ref::<StringArray>()
        .context("country column is not Utf8")?;
    let languages = languages
        .as_any()
        .downcast_ref::<StringArray>()
        .context("language column is not Utf8")?;
    debug!(
        kept = countries.len(),
        dropped = table.num_rows() - countries.len(),
        "dropped null rows"
    );

    let mut rows = Vec::with_capacity(countries.len());
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for i in 0..countries.len() {
        let (country, langs) = (countries.value(i), languages.value(i));
        if drop_duplicates && !seen.insert((country, langs)) {
            continue;
        }
        rows.push(ResponseRow::new(country, langs));
    }

    info!(rows = rows.len(), "cleaned survey rows");
    Ok(rows)
}
