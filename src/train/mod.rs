// ============================================================
// Layer 5 — Training Statistics
// ============================================================
// Console bookkeeping for a training loop:
//
//   average_meter.rs — online mean of one scalar signal
//   loss_stat.rs     — running averages of the loss terms, with
//                      optional terms switched on by the data
//   time_stat.rs     — per-epoch data/forward/visualize timing
//                      driven through an explicit phase machine

/// Running average of a scalar
pub mod average_meter;

/// Loss-term running averages and report formatting
pub mod loss_stat;

/// Per-epoch phase timing
pub mod time_stat;

pub use average_meter::AverageMeter;
pub use loss_stat::{LossStat, LossTerm, LossValues};
pub use time_stat::{EpochTiming, Phase, TimeStat};
