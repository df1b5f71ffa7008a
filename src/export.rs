// src/export.rs

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::Arc,
};
use tracing::info;

use crate::error::AnalysisError;
use crate::process::CountryPercentage;

/// Build an Arrow batch `(country, label, percentage)` from the final records.
pub fn to_record_batch(records: &[CountryPercentage]) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("label", DataType::Utf8, false),
        Field::new("percentage", DataType::Float64, false),
    ]);

    let country = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.country.as_str()),
    )) as ArrayRef;
    let label = Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.label.as_str()),
    )) as ArrayRef;
    let percentage = Arc::new(Float64Array::from_iter_values(
        records.iter().map(|r| r.percentage),
    )) as ArrayRef;

    RecordBatch::try_new(Arc::new(schema), vec![country, label, percentage])
        .context("building summary record batch")
}

fn write_parquet(records: &[CountryPercentage], path: &Path) -> Result<()> {
    let batch = to_record_batch(records)?;
    let file =
        File::create(path).with_context(|| format!("creating file {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating parquet writer")?;
    writer.write(&batch).context("writing summary batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_json(records: &[CountryPercentage], path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, records)
        .with_context(|| format!("writing {}", path.display()))?;
    out.flush()
        .with_context(|| format!("flushing {}", path.display()))
}

/// Write the final records to `path`; the extension picks the format
/// (`json` or `parquet`).
#[tracing::instrument(level = "info", skip(records, path), fields(path = %path.as_ref().display()))]
pub fn export_summary<P: AsRef<Path>>(records: &[CountryPercentage], path: P) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("json") => write_json(records, path)?,
        Some("parquet") => write_parquet(records, path)?,
        _ => {
            return Err(AnalysisError::UnsupportedExport {
                path: path.to_path_buf(),
            }
            .into())
        }
    }

    info!(records = records.len(), "exported summary");
    Ok(())
}
