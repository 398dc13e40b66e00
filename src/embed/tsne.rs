use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use linfa::traits::Transformer;
use linfa_tsne::TSneParams;
use ndarray::{s, Array2, Axis};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{Embedder, EmbeddingParams};
use crate::error::PipelineError;

/// Up to this many rows the exact gradient is used instead of Barnes-Hut.
/// The space-partitioning tree recurses without bound on small, regularly
/// spaced inputs.
pub const EXACT_GRADIENT_MAX_SAMPLES: usize = 500;

/// Jitter amplitude relative to the widest feature range. Breaks exact
/// distance ties, which the backend's neighbour search does not handle.
const JITTER_SCALE: f32 = 1e-4;

/// Barnes-Hut t-SNE backed by `linfa-tsne`.
///
/// The neighbour count becomes the perplexity, capped at `(N - 1) / 3`
/// which is the largest value the backend accepts for N rows. The pair
/// ratios have no t-SNE counterpart and are not used.
#[derive(Debug, Clone)]
pub struct TsneEmbedder {
    /// Barnes-Hut accuracy for inputs above [`EXACT_GRADIENT_MAX_SAMPLES`];
    /// 0.0 always runs the exact O(N²) gradient.
    pub approx_threshold: f32,
}

impl Default for TsneEmbedder {
    fn default() -> Self {
        TsneEmbedder {
            approx_threshold: 0.5,
        }
    }
}

impl TsneEmbedder {
    pub fn perplexity(params: &EmbeddingParams, n_samples: usize) -> f32 {
        let limit = n_samples.saturating_sub(1) as f32;
        let mut perplexity = (params.neighbors_for(n_samples) as f32).min(limit / 3.0);
        if 3.0 * perplexity > limit {
            perplexity *= 1.0 - f32::EPSILON;
        }
        perplexity
    }

    /// Gradient accuracy actually passed to the backend for `n_samples` rows.
    pub fn theta_for(&self, n_samples: usize) -> f32 {
        if n_samples <= EXACT_GRADIENT_MAX_SAMPLES {
            0.0
        } else {
            self.approx_threshold
        }
    }
}

/// Largest per-column range. Zero means every row is the same point.
fn feature_spread(data: &Array2<f32>) -> f32 {
    data.axis_iter(Axis(1))
        .map(|column| {
            let (lo, hi) = column
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            hi - lo
        })
        .fold(0.0, f32::max)
}

/// The backend refuses fewer input columns than output dimensions.
fn pad_columns(data: Array2<f32>, min_cols: usize) -> Array2<f32> {
    if data.ncols() >= min_cols {
        return data;
    }
    let mut padded = Array2::zeros((data.nrows(), min_cols));
    padded.slice_mut(s![.., ..data.ncols()]).assign(&data);
    padded
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Embedder for TsneEmbedder {
    fn name(&self) -> &'static str {
        "t-SNE"
    }

    fn embed(
        &self,
        data: Array2<f32>,
        params: &EmbeddingParams,
    ) -> Result<Array2<f32>, PipelineError> {
        let n_samples = data.nrows();
        let spread = feature_spread(&data);
        if spread == 0.0 {
            log::warn!("All {n_samples} feature rows are identical; placing every sample at the origin");
            return Ok(Array2::zeros((n_samples, params.n_components)));
        }

        let perplexity = Self::perplexity(params, n_samples);
        let theta = self.theta_for(n_samples);
        log::debug!(
            "t-SNE perplexity={perplexity:.3} theta={theta} max_iter={}",
            params.max_iter
        );

        let mut rng = match params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let amplitude = spread * JITTER_SCALE;
        let mut data = pad_columns(data, params.n_components);
        data.mapv_inplace(|v| v + rng.gen_range(-amplitude..=amplitude));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            TSneParams::embedding_size_with_rng(params.n_components, rng)
                .perplexity(perplexity)
                .approx_threshold(theta)
                .max_iter(params.max_iter)
                .transform(data)
        }));

        let coords = match outcome {
            Ok(result) => result.map_err(|e| PipelineError::Embedding(e.to_string()))?,
            Err(payload) => {
                return Err(PipelineError::Embedding(format!(
                    "t-SNE backend panicked: {}",
                    panic_message(payload.as_ref())
                )))
            }
        };

        if coords.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::Embedding(
                "t-SNE produced non-finite coordinates".to_string(),
            ));
        }
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EmbeddingParams {
        EmbeddingParams {
            seed: Some(1),
            max_iter: 300,
            ..Default::default()
        }
    }

    /// The backend may decline a degenerate input, but only with an error
    /// and never with a partial or non-finite layout.
    fn assert_layout_or_error(result: Result<Array2<f32>, PipelineError>, n: usize) {
        match result {
            Ok(coords) => {
                assert_eq!(coords.dim(), (n, 2));
                assert!(coords.iter().all(|v| v.is_finite()));
            }
            Err(e) => assert!(matches!(e, PipelineError::Embedding(_)), "{e}"),
        }
    }

    #[test]
    fn perplexity_is_capped_by_sample_count() {
        let params = EmbeddingParams::default();
        assert_eq!(TsneEmbedder::perplexity(&params, 1000), 10.0);
        assert_eq!(TsneEmbedder::perplexity(&params, 7), 2.0);
        for n in 2..12 {
            let p = TsneEmbedder::perplexity(&params, n);
            assert!(3.0 * p <= (n - 1) as f32, "n={n} p={p}");
        }
    }

    #[test]
    fn small_inputs_use_the_exact_gradient() {
        let tsne = TsneEmbedder::default();
        assert_eq!(tsne.theta_for(40), 0.0);
        assert_eq!(tsne.theta_for(EXACT_GRADIENT_MAX_SAMPLES), 0.0);
        assert_eq!(tsne.theta_for(EXACT_GRADIENT_MAX_SAMPLES + 1), 0.5);
    }

    #[test]
    fn embeds_two_clusters_into_n_by_2() {
        let n = 40;
        let data = Array2::from_shape_fn((n, 6), |(i, j)| {
            let offset = if i < n / 2 { 0.0 } else { 10.0 };
            offset + ((i * 7 + j * 3) % 5) as f32 * 0.1
        });
        let params = EmbeddingParams {
            seed: Some(42),
            ..params()
        };
        let coords = TsneEmbedder::default().embed(data, &params).unwrap();
        assert_eq!(coords.dim(), (n, 2));
        assert!(coords.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn two_identical_samples_share_the_origin() {
        let data = Array2::from_elem((2, 28), 0.5);
        let coords = TsneEmbedder::default().embed(data, &params()).unwrap();
        assert_eq!(coords, Array2::<f32>::zeros((2, 2)));
    }

    #[test]
    fn all_zero_rows_do_not_reach_the_backend() {
        let data = Array2::zeros((20, 28));
        let coords = TsneEmbedder::default().embed(data, &params()).unwrap();
        assert_eq!(coords.dim(), (20, 2));
        assert!(coords.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn two_distinct_samples() {
        let data = Array2::from_shape_fn((2, 28), |(i, _)| i as f32);
        assert_layout_or_error(TsneEmbedder::default().embed(data, &params()), 2);
    }

    #[test]
    fn evenly_spaced_ramps() {
        for n in [6, 7, 10, 40] {
            let data = Array2::from_shape_fn((n, 28), |(i, _)| i as f32);
            assert_layout_or_error(TsneEmbedder::default().embed(data, &params()), n);
        }
    }

    #[test]
    fn duplicated_rows_among_distinct_ones() {
        let data = Array2::from_shape_fn((12, 28), |(i, j)| ((i / 2) * (j % 3 + 1)) as f32);
        assert_layout_or_error(TsneEmbedder::default().embed(data, &params()), 12);
    }

    #[test]
    fn single_feature_column_is_padded() {
        let data = Array2::from_shape_fn((10, 1), |(i, _)| (i * i) as f32);
        assert_layout_or_error(TsneEmbedder::default().embed(data, &params()), 10);
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload = panic::catch_unwind(|| panic!("index out of bounds")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "index out of bounds");
        let payload = panic::catch_unwind(|| panic!("{} rows", 3)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "3 rows");
    }
}
