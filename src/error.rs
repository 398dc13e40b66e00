use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that abort a run before any output is written.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input directory not found: {0} (run the CP-center extraction step first)")]
    MissingInputDir(PathBuf),

    #[error("no usable samples in {0}")]
    NoSamples(PathBuf),

    #[error("not enough samples to embed: got {0}, need at least 2")]
    InsufficientSamples(usize),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("embedding returned a {got:?} matrix, expected {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
}
