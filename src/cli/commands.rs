// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Every subcommand takes the evaluation directory as its single
// positional argument. The snapshot lives at
// <eval_dir>/eval_result.snap and rendered images go to
// <eval_dir>/images.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::visualize_use_case::EvalConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a comparison image for every saved prediction
    Visualize(VisualizeArgs),

    /// Drop duplicate predictions of the same sample from a snapshot
    Dedup(SnapshotArgs),

    /// Print record and sample counts of a snapshot
    Summary(SnapshotArgs),
}

#[derive(Args, Debug)]
pub struct VisualizeArgs {
    /// Evaluation directory holding eval_result.snap
    #[arg(default_value = "evaluate_results")]
    pub eval_dir: PathBuf,

    /// Number of rendering workers
    #[arg(long, default_value_t = 8)]
    pub workers: usize,

    /// Side length, in pixels, of the square working image
    #[arg(long, default_value_t = 224)]
    pub image_size: u32,
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Evaluation directory holding eval_result.snap
    #[arg(default_value = "evaluate_results")]
    pub eval_dir: PathBuf,
}

impl From<&VisualizeArgs> for EvalConfig {
    fn from(a: &VisualizeArgs) -> Self {
        EvalConfig {
            eval_dir:   a.eval_dir.clone(),
            workers:    a.workers,
            image_size: a.image_size,
            ..EvalConfig::default()
        }
    }
}

impl From<&SnapshotArgs> for EvalConfig {
    fn from(a: &SnapshotArgs) -> Self {
        EvalConfig {
            eval_dir: a.eval_dir.clone(),
            ..EvalConfig::default()
        }
    }
}
