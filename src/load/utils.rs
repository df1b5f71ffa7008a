use anyhow::{Context, Result};
use regex::Regex;

/// Strip a leading BOM and surrounding whitespace from a header cell.
pub fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// Regex matching an empty cell or any of `markers` exactly.
pub fn null_regex(markers: &[String]) -> Result<Regex> {
    let alternatives: Vec<String> = std::iter::once(String::new())
        .chain(markers.iter().map(|m| regex::escape(m)))
        .collect();
    let pattern = format!("^(?:{})$", alternatives.join("|"));
    Regex::new(&pattern).with_context(|| format!("building null regex {pattern}"))
}
