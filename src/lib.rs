// ============================================================
// pose-eval-utils
// ============================================================
// Bookkeeping for a body-pose estimation pipeline:
//
//   domain/       — prediction records, sample descriptors,
//                   collaborator traits (Layer 3)
//   eval/         — ResultStore: accumulate, deduplicate,
//                   save/load prediction results (Layer 5)
//   train/        — running averages of loss terms and
//                   per-epoch phase timing (Layer 5)
//   infra/        — snapshot codec, image I/O, renderer,
//                   worker pool, CSV metrics log (Layer 6)
//   application/  — visualization and snapshot maintenance
//                   workflows (Layer 2)
//   cli/          — clap front end (Layer 1)
//
// The evaluator side and the training side never interact.

pub mod error;

pub mod domain;
pub mod eval;
pub mod train;
pub mod infra;
pub mod application;
pub mod cli;

pub use error::{Error, Result};
