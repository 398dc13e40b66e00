use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};

use crate::data::model::EmbeddingResult;

/// The exported coordinates as five parallel arrays.
/// Entry `i` of every array describes the same sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedColumns {
    pub subject: Vec<String>,
    pub idx_center: Vec<i64>,
    pub label: Vec<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl From<&EmbeddingResult> for ExportedColumns {
    fn from(result: &EmbeddingResult) -> Self {
        let samples = &result.samples;
        ExportedColumns {
            subject: samples.iter().map(|s| s.record.subject.clone()).collect(),
            idx_center: samples.iter().map(|s| s.record.center_index).collect(),
            label: samples.iter().map(|s| s.record.label.to_string()).collect(),
            x: samples.iter().map(|s| s.x).collect(),
            y: samples.iter().map(|s| s.y).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    subject: String,
    idx_center: i64,
    label: String,
    x: f64,
    y: f64,
}

/// Write the embedding to `path`, replacing any existing file.
/// Missing parent directories are created. Dispatch by extension:
/// `.parquet`, `.json` or `.csv`.
pub fn write_results(result: &EmbeddingResult, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !matches!(ext.as_str(), "parquet" | "pq" | "json" | "csv") {
        bail!("Unsupported output extension: .{ext}");
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let columns = ExportedColumns::from(result);
    let written = match ext.as_str() {
        "json" => write_json(&columns, path),
        "csv" => write_csv(&columns, path),
        _ => write_parquet(&columns, path),
    };
    written.with_context(|| format!("writing {}", path.display()))?;

    log::info!(
        "Saved coordinates and labels of {} samples to {}",
        result.len(),
        path.display()
    );
    Ok(())
}

fn write_parquet(columns: &ExportedColumns, path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("subject", DataType::Utf8, false),
        Field::new("idx_center", DataType::Int64, false),
        Field::new("label", DataType::Utf8, false),
        Field::new("x", DataType::Float64, false),
        Field::new("y", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(columns.subject.clone())),
            Arc::new(Int64Array::from(columns.idx_center.clone())),
            Arc::new(StringArray::from(columns.label.clone())),
            Arc::new(Float64Array::from(columns.x.clone())),
            Arc::new(Float64Array::from(columns.y.clone())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_json(columns: &ExportedColumns, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, columns)?;
    writer.flush()?;
    Ok(())
}

fn write_csv(columns: &ExportedColumns, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for i in 0..columns.subject.len() {
        writer.serialize(CsvRow {
            subject: columns.subject[i].clone(),
            idx_center: columns.idx_center[i],
            label: columns.label[i].clone(),
            x: columns.x[i],
            y: columns.y[i],
        })?;
    }
    writer.flush()?;
    Ok(())
}
