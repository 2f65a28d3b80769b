// ============================================================
// Layer 6 — Epoch Metrics Logger
// ============================================================
// Appends one CSV row per finished epoch combining the loss
// averages from LossStat with the timing from TimeStat.
//
// Output file: <dir>/metrics.csv
//
//   epoch,total_loss,kp_loss,data_time,forward_time,visualize_time,epoch_time
//   1,0.912300,0.451200,12.031000,88.410000,3.002000,103.520000
//
// Appending across runs is intentional: the header is only
// written when the file is created.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::train::{
    loss_stat::{LossStat, LossTerm},
    time_stat::EpochTiming,
};

const HEADER: &str = "epoch,total_loss,kp_loss,data_time,forward_time,visualize_time,epoch_time";

/// One row of the metrics log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch: usize,

    /// Running average of the total loss at the end of the epoch
    pub total_loss: f64,

    /// Running average of the 2D keypoint loss
    pub kp_loss: f64,

    /// Seconds spent in each phase during this epoch
    pub data_time:      f64,
    pub forward_time:   f64,
    pub visualize_time: f64,
    pub epoch_time:     f64,
}

impl EpochMetrics {
    /// Combine loss averages and one epoch's timing.
    /// Fails if no loss update has been recorded.
    pub fn from_stats(losses: &LossStat, timing: &EpochTiming) -> Result<Self> {
        let avg = |term: LossTerm| {
            losses
                .average(term)
                .ok_or(Error::NoData("no loss update recorded"))
        };
        Ok(Self {
            epoch:          timing.epoch,
            total_loss:     avg(LossTerm::Total)?,
            kp_loss:        avg(LossTerm::Joints2d)?,
            data_time:      timing.data_time,
            forward_time:   timing.forward_time,
            visualize_time: timing.visualize_time,
            epoch_time:     timing.epoch_time,
        })
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Open (or create) `<dir>/metrics.csv`.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path).map_err(|e| Error::io(&csv_path, e))?;
            writeln!(f, "{HEADER}").map_err(|e| Error::io(&csv_path, e))?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .map_err(|e| Error::io(&self.csv_path, e))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.total_loss,
            m.kp_loss,
            m.data_time,
            m.forward_time,
            m.visualize_time,
            m.epoch_time,
        )
        .map_err(|e| Error::io(&self.csv_path, e))?;

        tracing::debug!("Logged epoch {} metrics: total_loss={:.4}", m.epoch, m.total_loss);
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::loss_stat::LossValues;

    fn timing(epoch: usize) -> EpochTiming {
        EpochTiming {
            epoch,
            data_time:      1.5,
            forward_time:   2.0,
            visualize_time: 0.25,
            epoch_time:     3.75,
        }
    }

    #[test]
    fn test_from_stats() {
        let mut losses = LossStat::new(10);
        losses.update(&LossValues::new(1.0, 0.5));
        losses.update(&LossValues::new(3.0, 1.5));

        let m = EpochMetrics::from_stats(&losses, &timing(4)).unwrap();
        assert_eq!(m.epoch, 4);
        assert_eq!(m.total_loss, 2.0);
        assert_eq!(m.kp_loss, 1.0);
        assert_eq!(m.epoch_time, 3.75);
    }

    #[test]
    fn test_from_stats_without_losses() {
        let losses = LossStat::new(10);
        assert!(matches!(
            EpochMetrics::from_stats(&losses, &timing(1)),
            Err(Error::NoData(_))
        ));
    }

    #[test]
    fn test_log_appends_rows_under_single_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut losses = LossStat::new(10);
        losses.update(&LossValues::new(1.0, 0.5));

        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::from_stats(&losses, &timing(1)).unwrap()).unwrap();

        // Reopening must not write a second header
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::from_stats(&losses, &timing(2)).unwrap()).unwrap();

        let text  = std::fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "1,1.000000,0.500000,1.500000,2.000000,0.250000,3.750000");
        assert_eq!(lines.len(), 3);
    }
}
