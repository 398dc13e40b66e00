use std::path::PathBuf;

use clap::Parser;

use crate::embed::EmbeddingParams;

/// Input directory relative to the project root.
const DEFAULT_INPUT_DIR: &str = "GUI_results/AllCenters/CP_centers_all";
/// Output file relative to the project root.
const DEFAULT_OUTPUT: &str = "GUI_results/AllCenters/pacmap_coords.parquet";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Root that the default input and output paths are resolved against
    /// (default: the directory holding the executable)
    #[arg(long, env = "CP_EMBED_ROOT")]
    pub project_root: Option<PathBuf>,

    /// Directory holding the per-sample files (default: <root>/GUI_results/AllCenters/CP_centers_all)
    #[arg(long, env = "CP_EMBED_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Output file; .parquet, .json or .csv (default: <root>/GUI_results/AllCenters/pacmap_coords.parquet)
    #[arg(long, env = "CP_EMBED_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Extension of the per-sample files
    #[arg(long, default_value = "json")]
    pub extension: String,

    /// Fix the embedding RNG for reproducible layouts
    #[arg(long, env = "CP_EMBED_SEED")]
    pub seed: Option<u64>,

    /// Neighbourhood size (auto when omitted)
    #[arg(long)]
    pub n_neighbors: Option<usize>,

    /// Embedding iterations
    #[arg(long, default_value = "1000")]
    pub max_iter: usize,

    /// Do not open the plot window
    #[arg(long)]
    pub no_display: bool,
}

/// Directory of the running executable, so default paths do not move with
/// the working directory.
fn executable_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent().map(PathBuf::from)
}

impl Config {
    pub fn project_root(&self) -> PathBuf {
        if let Some(root) = &self.project_root {
            return root.clone();
        }
        executable_dir().unwrap_or_else(|| {
            log::warn!("Cannot locate the executable; resolving default paths against the working directory");
            PathBuf::from(".")
        })
    }

    pub fn input_dir(&self) -> PathBuf {
        self.input_dir
            .clone()
            .unwrap_or_else(|| self.project_root().join(DEFAULT_INPUT_DIR))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.project_root().join(DEFAULT_OUTPUT))
    }

    /// Embedding hyperparameters. The pair ratios stay at their fixed defaults.
    pub fn embedding_params(&self) -> EmbeddingParams {
        EmbeddingParams {
            n_neighbors: self.n_neighbors,
            seed: self.seed,
            max_iter: self.max_iter,
            ..EmbeddingParams::default()
        }
    }
}
