//! Embedding engine: the boundary to the dimensionality-reduction library.
//!
//! The pipeline only prepares a clean matrix and stores the coordinates it
//! gets back. Which algorithm produces them is behind [`Embedder`].

pub mod tsne;

use ndarray::Array2;

use crate::data::model::{EmbeddingResult, SampleTable};
use crate::error::PipelineError;

pub use tsne::TsneEmbedder;

/// Hyperparameters handed to an [`Embedder`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingParams {
    /// Target dimensionality. The pipeline always asks for 2.
    pub n_components: usize,
    /// Neighbourhood size; `None` selects it from the sample count.
    pub n_neighbors: Option<usize>,
    /// Mid-near pairs per neighbour pair.
    pub mn_ratio: f32,
    /// Further pairs per neighbour pair.
    pub fp_ratio: f32,
    /// Fixed RNG seed. `None` gives a different layout on every run.
    pub seed: Option<u64>,
    pub max_iter: usize,
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        EmbeddingParams {
            n_components: 2,
            n_neighbors: None,
            mn_ratio: 0.5,
            fp_ratio: 2.0,
            seed: None,
            max_iter: 1000,
        }
    }
}

impl EmbeddingParams {
    /// Effective neighbour count for `n_samples` rows.
    ///
    /// Auto mode uses 10 up to 10 000 samples and grows logarithmically after.
    pub fn neighbors_for(&self, n_samples: usize) -> usize {
        if let Some(k) = self.n_neighbors {
            return k;
        }
        if n_samples <= 10_000 {
            10
        } else {
            (10.0 + 15.0 * ((n_samples as f64).log10() - 4.0)).round() as usize
        }
    }
}

/// A dimensionality-reduction backend.
pub trait Embedder {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Map an N×D matrix of finite values to N×`params.n_components`.
    fn embed(&self, data: Array2<f32>, params: &EmbeddingParams)
        -> Result<Array2<f32>, PipelineError>;
}

/// Run the embedder over the table's features and attach the coordinates.
pub fn embed_table(
    table: SampleTable,
    embedder: &dyn Embedder,
    params: &EmbeddingParams,
) -> Result<EmbeddingResult, PipelineError> {
    if table.len() < 2 {
        return Err(PipelineError::InsufficientSamples(table.len()));
    }
    let matrix = table.feature_matrix();
    log::info!(
        "Embedding {}x{} feature matrix with {} (n_neighbors={}, MN_ratio={}, FP_ratio={}, seed={:?})",
        matrix.nrows(),
        matrix.ncols(),
        embedder.name(),
        params.neighbors_for(matrix.nrows()),
        params.mn_ratio,
        params.fp_ratio,
        params.seed
    );
    let coords = embedder.embed(matrix, params)?;
    EmbeddingResult::attach(table, &coords)
}
