// src/load/mod.rs
pub mod utils;

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, StringArray},
    compute::concat_batches,
    csv::ReaderBuilder,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    collections::HashSet,
    fs::File,
    path::Path,
    sync::Arc,
};
use tracing::{debug, info, warn};

use crate::config::ColumnNames;
use crate::error::AnalysisError;
use utils::{clean_header, null_regex};

const BATCH_SIZE: usize = 64 * 1024;

/// The survey's question catalogue. Loaded for completeness; nothing in the
/// computation reads it.
#[derive(Debug)]
pub struct SchemaTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Survey responses projected to the id, country and language columns.
#[derive(Debug)]
pub struct SurveyTable {
    pub columns: ColumnNames,
    /// All columns Utf8 and nullable.
    pub batch: RecordBatch,
}

impl SurveyTable {
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    fn string_column(&self, name: &str) -> Result<&StringArray> {
        self.batch
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| anyhow!("column {name} is not a loaded Utf8 column"))
    }

    pub fn response_ids(&self) -> Result<&StringArray> {
        self.string_column(&self.columns.response_id)
    }

    pub fn countries(&self) -> Result<&StringArray> {
        self.string_column(&self.columns.country)
    }

    pub fn languages(&self) -> Result<&StringArray> {
        self.string_column(&self.columns.languages)
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(AnalysisError::InputNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(())
}

fn read_headers(path: &Path) -> Result<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = rdr
        .headers()
        .with_context(|| format!("reading header row of {}", path.display()))?;
    Ok(headers.iter().map(clean_header).collect())
}

/// Read the schema CSV into memory as plain strings.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_schema_table<P: AsRef<Path>>(path: P) -> Result<SchemaTable> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header row of {}", path.display()))?
        .iter()
        .map(clean_header)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result
            .with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    info!(columns = headers.len(), rows = rows.len(), "loaded schema table");
    Ok(SchemaTable { headers, rows })
}

/// Read the survey CSV, keeping only the id, country and language columns.
///
/// Fails fast with [`AnalysisError::InputNotFound`] or
/// [`AnalysisError::MissingColumn`]. Cells matching `null_values` (or empty)
/// become nulls.
#[tracing::instrument(level = "info", skip(path, columns, null_values), fields(path = %path.as_ref().display()))]
pub fn load_survey_table<P: AsRef<Path>>(
    path: P,
    columns: &ColumnNames,
    null_values: &[String],
) -> Result<SurveyTable> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let headers = read_headers(path)?;
    debug!(columns = headers.len(), "survey header");

    let mut projection = Vec::with_capacity(3);
    for name in [&columns.response_id, &columns.country, &columns.languages] {
        let idx = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::MissingColumn {
                path: path.to_path_buf(),
                column: name.clone(),
            })?;
        projection.push(idx);
    }

    let fields: Vec<Field> = headers
        .iter()
        .map(|n| Field::new(n, DataType::Utf8, true))
        .collect();
    let schema = Schema::new(fields);
    let projected = Arc::new(
        schema
            .project(&projection)
            .context("projecting survey schema")?,
    );

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .with_batch_size(BATCH_SIZE)
        .with_projection(projection)
        .with_null_regex(null_regex(null_values)?)
        .build(file)
        .context("creating CSV reader")?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading survey rows from {}", path.display()))?;
    let batch = concat_batches(&projected, &batches).context("concatenating survey batches")?;

    let table = SurveyTable {
        columns: columns.clone(),
        batch,
    };
    check_response_ids(&table)?;

    info!(rows = table.num_rows(), "loaded survey table");
    Ok(table)
}

/// Response ids should be unique integers. Violations are logged, not fatal.
fn check_response_ids(table: &SurveyTable) -> Result<()> {
    let ids = table.response_ids()?;
    let mut seen = HashSet::with_capacity(ids.len());
    let mut invalid = 0usize;
    let mut duplicated = 0usize;

    for id in ids.iter() {
        match id.map(|s| s.trim().parse::<u64>()) {
            Some(Ok(n)) => {
                if !seen.insert(n) {
                    duplicated += 1;
                }
            }
            _ => invalid += 1,
        }
    }

    if invalid > 0 {
        warn!(invalid, column = %table.columns.response_id, "non-numeric or missing response ids");
    }
    if duplicated > 0 {
        warn!(duplicated, column = %table.columns.response_id, "duplicate response ids");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        Ok(tmp)
    }

    fn default_nulls() -> Vec<String> {
        crate::config::AnalysisConfig::default().null_values
    }

    #[test]
    fn loads_projected_columns_with_nulls() -> Result<()> {
        let tmp = write_csv(
            "\u{feff}ResponseId,MainBranch,Country,LanguageHaveWorkedWith\n\
             1,dev,Germany,Python\n\
             2,dev,NA,Rust\n\
             5,dev,France,\n\
             9,dev,\"Korea, Republic of\",NaN\n",
        )?;

        let table = load_survey_table(tmp.path(), &ColumnNames::default(), &default_nulls())?;
        assert_eq!(table.num_rows(), 4);
        assert_eq!(table.batch.num_columns(), 3);

        let countries = table.countries()?;
        assert_eq!(countries.value(0), "Germany");
        assert!(countries.is_null(1));
        assert_eq!(countries.value(3), "Korea, Republic of");

        let langs = table.languages()?;
        assert_eq!(langs.value(0), "Python");
        assert!(langs.is_null(2));
        assert!(langs.is_null(3));

        assert_eq!(table.response_ids()?.value(2), "5");
        Ok(())
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_survey_table(
            "does/not/exist.csv",
            &ColumnNames::default(),
            &default_nulls(),
        )
        .unwrap_err();
        match err.downcast_ref::<AnalysisError>() {
            Some(AnalysisError::InputNotFound { path }) => {
                assert_eq!(path, Path::new("does/not/exist.csv"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_column_names_the_column() -> Result<()> {
        let tmp = write_csv("ResponseId,Country\n1,Germany\n")?;
        let err = load_survey_table(tmp.path(), &ColumnNames::default(), &default_nulls())
            .unwrap_err();
        match err.downcast_ref::<AnalysisError>() {
            Some(AnalysisError::MissingColumn { column, .. }) => {
                assert_eq!(column, "LanguageHaveWorkedWith")
            }
            other => panic!("unexpected error {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn header_only_file_loads_empty() -> Result<()> {
        let tmp = write_csv("ResponseId,Country,LanguageHaveWorkedWith\n")?;
        let table = load_survey_table(tmp.path(), &ColumnNames::default(), &default_nulls())?;
        assert_eq!(table.num_rows(), 0);
        Ok(())
    }

    #[test]
    fn schema_table_keeps_all_rows() -> Result<()> {
        let tmp = write_csv(
            "qid,qname,question,force_resp\n\
             QID1,MainBranch,\"Which of the following, if any?\",False\n\
             QID2,Country,Where do you live?,True\n",
        )?;
        let schema = load_schema_table(tmp.path())?;
        assert_eq!(schema.headers, vec!["qid", "qname", "question", "force_resp"]);
        assert_eq!(schema.rows.len(), 2);
        assert_eq!(schema.rows[0][2], "Which of the following, if any?");
        Ok(())
    }
}
