use std::path::Path;

use anyhow::Result;

use super::collector::SampleFile;
use super::loader::load_record;
use super::model::{Record, SampleTable};
use crate::error::PipelineError;

/// Load every collected file, dropping the gaps.
pub fn load_records(files: &[SampleFile]) -> Result<Vec<Record>> {
    let mut records = Vec::with_capacity(files.len());
    for file in files {
        if let Some(record) = load_record(file)? {
            records.push(record);
        }
    }
    log::debug!("{} of {} files yielded a record", records.len(), files.len());
    Ok(records)
}

/// Build the sample table and report what was loaded.
///
/// Fails when nothing was loaded, and again when fewer than two samples
/// remain since the embedding needs pairwise structure.
pub fn assemble(records: Vec<Record>, source: &Path) -> Result<SampleTable, PipelineError> {
    let table = SampleTable::new(records);
    log::info!("Loaded {} CP-center samples", table.len());
    if table.is_empty() {
        return Err(PipelineError::NoSamples(source.to_path_buf()));
    }

    log::info!("Label distribution:");
    for (label, count) in table.label_counts() {
        log::info!("  {label:<8} {count}");
    }

    if table.len() < 2 {
        return Err(PipelineError::InsufficientSamples(table.len()));
    }
    Ok(table)
}
