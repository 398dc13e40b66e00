use anyhow::Result;

use crate::config::Config;
use crate::data::collector::collect_sample_files;
use crate::data::model::EmbeddingResult;
use crate::data::table::{assemble, load_records};
use crate::embed::{embed_table, Embedder};
use crate::export::write_results;

/// Collect, load, assemble and embed. Nothing is written.
pub fn embed_samples(config: &Config, embedder: &dyn Embedder) -> Result<EmbeddingResult> {
    let dir = config.input_dir();
    let files = collect_sample_files(&dir, &config.extension)?;
    log::debug!("{} candidate files in {}", files.len(), dir.display());

    let records = load_records(&files)?;
    let table = assemble(records, &dir)?;
    let result = embed_table(table, embedder, &config.embedding_params())?;
    Ok(result)
}

/// The whole run: embed, show the result unless `no_display` is set, then
/// write the output file. A failure before export leaves no file behind.
pub fn run<V>(config: &Config, embedder: &dyn Embedder, visualize: V) -> Result<EmbeddingResult>
where
    V: FnOnce(&EmbeddingResult),
{
    let result = embed_samples(config, embedder)?;
    if !config.no_display {
        visualize(&result);
    }
    write_results(&result, &config.output_path())?;
    Ok(result)
}
