use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, LargeListArray, ListArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::collector::SampleFile;
use super::model::{ClassLabel, Record};

/// Name of the feature array inside a sample file.
pub const FEATURE_KEY: &str = "feat_row";
/// Name of the class-score array inside a sample file.
pub const SCORES_KEY: &str = "scores";

/// The two named arrays of one sample file, flattened to 1-D.
/// `None` means the array is not present in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleArrays {
    pub feat_row: Option<Vec<f64>>,
    pub scores: Option<Vec<f64>>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Turn one collected file into a [`Record`].
///
/// Returns `Ok(None)` when the file lacks one of the arrays or has an empty
/// score vector; such files are gaps, not failures. A file that cannot be
/// decoded at all is an error.
pub fn load_record(file: &SampleFile) -> Result<Option<Record>> {
    let arrays = load_arrays(&file.path)
        .with_context(|| format!("loading {}", file.path.display()))?;

    let (Some(features), Some(scores)) = (arrays.feat_row, arrays.scores) else {
        log::debug!(
            "skipping {}: missing '{FEATURE_KEY}' or '{SCORES_KEY}'",
            file.path.display()
        );
        return Ok(None);
    };

    let Some(label) = ClassLabel::from_scores(&scores) else {
        log::debug!("skipping {}: empty score vector", file.path.display());
        return Ok(None);
    };

    Ok(Some(Record {
        subject: file.subject.clone(),
        center_index: file.center_index,
        label,
        features,
    }))
}

/// Read `feat_row` and `scores` from a sample file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `{ "feat_row": [[...]], "scores": [[...]] }`, any nesting
/// * `.parquet` – columns `feat_row` and `scores`, list or plain float columns
pub fn load_arrays(path: &Path) -> Result<SampleArrays> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<SampleArrays> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let obj = root.as_object().context("Expected top-level JSON object")?;

    let array = |key: &str| -> Result<Option<Vec<f64>>> {
        obj.get(key)
            .map(|v| -> Result<Vec<f64>> {
                let mut out = Vec::new();
                flatten_json(v, &mut out).with_context(|| format!("reading '{key}'"))?;
                Ok(out)
            })
            .transpose()
    };

    Ok(SampleArrays {
        feat_row: array(FEATURE_KEY)?,
        scores: array(SCORES_KEY)?,
    })
}

/// Row-major flatten of a (possibly nested) numeric JSON array.
fn flatten_json(val: &JsonValue, out: &mut Vec<f64>) -> Result<()> {
    match val {
        JsonValue::Array(items) => {
            for item in items {
                flatten_json(item, out)?;
            }
        }
        JsonValue::Number(n) => out.push(n.as_f64().context("number out of range")?),
        JsonValue::Null => out.push(f64::NAN),
        other => bail!("expected a number, got {other}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet sample file.
///
/// Each of `feat_row` / `scores` may be a List<Float64|Float32> column (one
/// list per row, typically a single row) or a plain float column. All rows
/// are concatenated in order.
fn load_parquet(path: &Path) -> Result<SampleArrays> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut feat_row = schema.index_of(FEATURE_KEY).ok().map(|_| Vec::new());
    let mut scores = schema.index_of(SCORES_KEY).ok().map(|_| Vec::new());

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        if let Some(out) = feat_row.as_mut() {
            append_column(&batch, FEATURE_KEY, out)?;
        }
        if let Some(out) = scores.as_mut() {
            append_column(&batch, SCORES_KEY, out)?;
        }
    }

    Ok(SampleArrays { feat_row, scores })
}

fn append_column(batch: &RecordBatch, name: &str, out: &mut Vec<f64>) -> Result<()> {
    let col = batch
        .column_by_name(name)
        .with_context(|| format!("Parquet batch missing '{name}' column"))?;
    append_values(col, out).with_context(|| format!("reading '{name}'"))
}

// -- Parquet / Arrow helpers --

/// Append every value of `col` to `out`, descending into list columns.
/// Null floats become NaN.
fn append_values(col: &ArrayRef, out: &mut Vec<f64>) -> Result<()> {
    match col.data_type() {
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            out.extend(arr.iter().map(|v| v.unwrap_or(f64::NAN)));
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            out.extend(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)));
        }
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            for row in 0..list_arr.len() {
                if list_arr.is_null(row) {
                    bail!("null value in list column at row {row}");
                }
                append_values(&list_arr.value(row), out)?;
            }
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            for row in 0..list_arr.len() {
                if list_arr.is_null(row) {
                    bail!("null value in list column at row {row}");
                }
                append_values(&list_arr.value(row), out)?;
            }
        }
        other => bail!("Expected a float or list column, got {other:?}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float32Builder, ListBuilder};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn sample_file(dir: &Path, name: &str, body: &str) -> SampleFile {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        let (subject, center_index) =
            crate::data::collector::parse_file_name(name, "json").unwrap();
        SampleFile {
            path,
            subject,
            center_index,
        }
    }

    #[test]
    fn json_record_is_labelled_by_argmax() {
        let tmp = tempfile::tempdir().unwrap();
        let file = sample_file(
            tmp.path(),
            "SUBJ01_7.json",
            r#"{"feat_row": [[1.5, 2.5, 3.5]], "scores": [[0.1, 0.9, 0.05, 0, 0, 0]]}"#,
        );
        let record = load_record(&file).unwrap().unwrap();
        assert_eq!(record.subject, "SUBJ01");
        assert_eq!(record.center_index, 7);
        assert_eq!(record.label, ClassLabel::Lpd);
        assert_eq!(record.features, vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn json_nulls_are_kept_as_nan() {
        let tmp = tempfile::tempdir().unwrap();
        let file = sample_file(
            tmp.path(),
            "S_1.json",
            r#"{"feat_row": [1.0, null], "scores": [0, 0, 0, 0, 0, 1]}"#,
        );
        let record = load_record(&file).unwrap().unwrap();
        assert_eq!(record.label, ClassLabel::Other);
        assert!(record.features[1].is_nan());
    }

    #[test]
    fn missing_array_is_a_gap() {
        let tmp = tempfile::tempdir().unwrap();
        let file = sample_file(tmp.path(), "S_1.json", r#"{"feat_row": [1.0, 2.0]}"#);
        assert_eq!(load_record(&file).unwrap(), None);
    }

    #[test]
    fn empty_scores_are_a_gap() {
        let tmp = tempfile::tempdir().unwrap();
        let file = sample_file(tmp.path(), "S_1.json", r#"{"feat_row": [1.0], "scores": []}"#);
        assert_eq!(load_record(&file).unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = sample_file(tmp.path(), "S_1.json", "not json");
        assert!(load_record(&file).is_err());
        let file = sample_file(tmp.path(), "S_2.json", r#"{"scores": ["high"]}"#);
        assert!(load_record(&file).is_err());
    }

    #[test]
    fn parquet_list_columns_are_flattened() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("P_3.parquet");

        let mut feat = ListBuilder::new(Float32Builder::new());
        feat.values().append_slice(&[0.5, 1.5]);
        feat.append(true);
        let schema = Arc::new(Schema::new(vec![Field::new(
            FEATURE_KEY,
            DataType::List(Arc::new(Field::new("item", DataType::Float32, true))),
            false,
        )]));
        let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(feat.finish())]).unwrap();

        let scores_schema = Schema::new(vec![
            schema.field(0).clone(),
            Field::new(SCORES_KEY, DataType::Float64, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(scores_schema),
            vec![
                batch.column(0).clone(),
                Arc::new(Float64Array::from(vec![0.7])),
            ],
        )
        .unwrap();

        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let arrays = load_arrays(&path).unwrap();
        assert_eq!(arrays.feat_row, Some(vec![0.5, 1.5]));
        assert_eq!(arrays.scores, Some(vec![0.7]));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(load_arrays(Path::new("S_1.mat")).is_err());
    }
}
