// ============================================================
// Layer 5 — Epoch Timing
// ============================================================
// Splits each epoch's wall-clock time into data loading, forward
// pass and visualization, and keeps running averages of each
// across epochs.
//
// The training loop marks phase boundaries in a fixed cycle:
//
//   epoch_begin ─► DataLoading ─mark_data_done─► Forwarding
//        ▲              ▲                            │
//        │              │                   mark_forward_done
//        │     mark_visualize_done                   ▼
//        │              └──────────────────── Visualizing
//        │
//   Idle ◄─format_report── EpochDone ◄─epoch_end── DataLoading
//
// A boundary called from the wrong phase returns PhaseOrder and
// changes nothing. Each boundary has an `_at` variant taking the
// clock reading explicitly.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::train::average_meter::AverageMeter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    DataLoading,
    Forwarding,
    Visualizing,
    EpochDone,
}

/// Timing of one finished epoch, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochTiming {
    pub epoch:          usize,
    pub data_time:      f64,
    pub forward_time:   f64,
    pub visualize_time: f64,
    pub epoch_time:     f64,
}

#[derive(Debug, Clone)]
pub struct TimeStat {
    data_time:      AverageMeter,
    forward_time:   AverageMeter,
    visualize_time: AverageMeter,
    total_epoch:    usize,

    phase:         Phase,
    epoch:         usize,
    epoch_start:   Instant,
    segment_start: Instant,

    data_epoch:      Duration,
    forward_epoch:   Duration,
    visualize_epoch: Duration,
    epoch_elapsed:   Option<Duration>,

    last_epoch: Option<EpochTiming>,
}

impl TimeStat {
    pub fn new(total_epoch: usize) -> Self {
        let now = Instant::now();
        Self {
            data_time:       AverageMeter::new(),
            forward_time:    AverageMeter::new(),
            visualize_time:  AverageMeter::new(),
            total_epoch,
            phase:           Phase::Idle,
            epoch:           0,
            epoch_start:     now,
            segment_start:   now,
            data_epoch:      Duration::ZERO,
            forward_epoch:   Duration::ZERO,
            visualize_epoch: Duration::ZERO,
            epoch_elapsed:   None,
            last_epoch:      None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn data_elapsed(&self) -> Duration {
        self.data_epoch
    }

    pub fn forward_elapsed(&self) -> Duration {
        self.forward_epoch
    }

    pub fn visualize_elapsed(&self) -> Duration {
        self.visualize_epoch
    }

    /// Wall-clock duration of the current epoch, once it has ended.
    pub fn epoch_elapsed(&self) -> Option<Duration> {
        self.epoch_elapsed
    }

    /// Timing of the most recently reported epoch.
    pub fn last_epoch(&self) -> Option<EpochTiming> {
        self.last_epoch
    }

    pub fn epoch_begin(&mut self, epoch: usize) -> Result<()> {
        self.epoch_begin_at(epoch, Instant::now())
    }

    pub fn epoch_begin_at(&mut self, epoch: usize, now: Instant) -> Result<()> {
        self.require_phase(&[Phase::Idle, Phase::EpochDone], "begin an epoch")?;
        self.epoch           = epoch;
        self.epoch_start     = now;
        self.segment_start   = now;
        self.data_epoch      = Duration::ZERO;
        self.forward_epoch   = Duration::ZERO;
        self.visualize_epoch = Duration::ZERO;
        self.epoch_elapsed   = None;
        self.phase           = Phase::DataLoading;
        Ok(())
    }

    pub fn mark_data_done(&mut self) -> Result<()> {
        self.mark_data_done_at(Instant::now())
    }

    pub fn mark_data_done_at(&mut self, now: Instant) -> Result<()> {
        self.require_phase(&[Phase::DataLoading], "mark data loading done")?;
        let elapsed = self.close_segment(now);
        self.data_epoch += elapsed;
        self.phase = Phase::Forwarding;
        Ok(())
    }

    pub fn mark_forward_done(&mut self) -> Result<()> {
        self.mark_forward_done_at(Instant::now())
    }

    pub fn mark_forward_done_at(&mut self, now: Instant) -> Result<()> {
        self.require_phase(&[Phase::Forwarding], "mark forward pass done")?;
        let elapsed = self.close_segment(now);
        self.forward_epoch += elapsed;
        self.phase = Phase::Visualizing;
        Ok(())
    }

    pub fn mark_visualize_done(&mut self) -> Result<()> {
        self.mark_visualize_done_at(Instant::now())
    }

    pub fn mark_visualize_done_at(&mut self, now: Instant) -> Result<()> {
        self.require_phase(&[Phase::Visualizing], "mark visualization done")?;
        let elapsed = self.close_segment(now);
        self.visualize_epoch += elapsed;
        self.phase = Phase::DataLoading;
        Ok(())
    }

    pub fn epoch_end(&mut self) -> Result<()> {
        self.epoch_end_at(Instant::now())
    }

    pub fn epoch_end_at(&mut self, now: Instant) -> Result<()> {
        self.require_phase(&[Phase::DataLoading], "end the epoch")?;
        self.epoch_elapsed = Some(now.saturating_duration_since(self.epoch_start));
        self.phase = Phase::EpochDone;
        Ok(())
    }

    /// Fold the finished epoch into the running averages and format
    /// the summary line. Moves the tracker back to `Idle`.
    pub fn format_report(&mut self) -> Result<String> {
        self.require_phase(&[Phase::EpochDone], "report epoch timing")?;
        let epoch_time = self
            .epoch_elapsed
            .ok_or(Error::NoData("epoch duration not measured"))?
            .as_secs_f64();

        self.data_time.update(self.data_epoch.as_secs_f64());
        self.forward_time.update(self.forward_epoch.as_secs_f64());
        self.visualize_time.update(self.visualize_epoch.as_secs_f64());

        // Each meter was just updated, so the averages are defined.
        let data      = self.data_time.avg().unwrap_or_default();
        let forward   = self.forward_time.avg().unwrap_or_default();
        let visualize = self.visualize_time.avg().unwrap_or_default();

        self.last_epoch = Some(EpochTiming {
            epoch:          self.epoch,
            data_time:      self.data_epoch.as_secs_f64(),
            forward_time:   self.forward_epoch.as_secs_f64(),
            visualize_time: self.visualize_epoch.as_secs_f64(),
            epoch_time,
        });
        self.phase = Phase::Idle;

        Ok(format!(
            "End of epoch {} / {} \tTime Taken: data {:.2}, forward {:.2}, visualize {:.2}, Total {:.2} \n\
             Epoch {} completes in {}",
            self.epoch,
            self.total_epoch,
            data,
            forward,
            visualize,
            epoch_time,
            self.epoch,
            chrono::Local::now().format("%Y-%m-%d:%H:%M:%S"),
        ))
    }

    pub fn print_report(&mut self) -> Result<()> {
        println!("{}", self.format_report()?);
        Ok(())
    }

    /// Running average of per-epoch data time over reported epochs.
    pub fn data_time_avg(&self) -> Option<f64> {
        self.data_time.avg()
    }

    pub fn forward_time_avg(&self) -> Option<f64> {
        self.forward_time.avg()
    }

    pub fn visualize_time_avg(&self) -> Option<f64> {
        self.visualize_time.avg()
    }

    fn close_segment(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.segment_start);
        self.segment_start = now;
        elapsed
    }

    fn require_phase(&self, allowed: &[Phase], action: &'static str) -> Result<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(Error::PhaseOrder { action, phase: self.phase })
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_phases_attribute_time() {
        let t0 = Instant::now();
        let mut ts = TimeStat::new(10);

        ts.epoch_begin_at(1, t0).unwrap();
        ts.mark_data_done_at(t0 + ms(30)).unwrap();
        ts.mark_forward_done_at(t0 + ms(80)).unwrap();
        ts.mark_visualize_done_at(t0 + ms(90)).unwrap();
        ts.epoch_end_at(t0 + ms(90)).unwrap();

        assert_eq!(ts.data_elapsed(), ms(30));
        assert_eq!(ts.forward_elapsed(), ms(50));
        assert_eq!(ts.visualize_elapsed(), ms(10));
        assert_eq!(ts.epoch_elapsed(), Some(ms(90)));
    }

    #[test]
    fn test_iterations_accumulate_within_epoch() {
        let t0 = Instant::now();
        let mut ts = TimeStat::new(10);
        ts.epoch_begin_at(0, t0).unwrap();

        let mut t = t0;
        for _ in 0..3 {
            t += ms(10);
            ts.mark_data_done_at(t).unwrap();
            t += ms(20);
            ts.mark_forward_done_at(t).unwrap();
            t += ms(5);
            ts.mark_visualize_done_at(t).unwrap();
        }
        ts.epoch_end_at(t).unwrap();

        assert_eq!(ts.data_elapsed(), ms(30));
        assert_eq!(ts.forward_elapsed(), ms(60));
        assert_eq!(ts.visualize_elapsed(), ms(15));
        assert_eq!(ts.epoch_elapsed(), Some(ms(105)));
    }

    #[test]
    fn test_wall_clock_scenario() {
        let mut ts = TimeStat::new(1);
        ts.epoch_begin(1).unwrap();
        std::thread::sleep(ms(20));
        ts.mark_data_done().unwrap();
        std::thread::sleep(ms(40));
        ts.mark_forward_done().unwrap();
        std::thread::sleep(ms(20));
        ts.mark_visualize_done().unwrap();
        ts.epoch_end().unwrap();

        assert!(ts.data_elapsed() >= ms(20));
        assert!(ts.forward_elapsed() >= ms(40));
        assert!(ts.visualize_elapsed() >= ms(20));

        let sum   = ts.data_elapsed() + ts.forward_elapsed() + ts.visualize_elapsed();
        let total = ts.epoch_elapsed().unwrap();
        assert!(total >= sum);
        assert!(total - sum < ms(10));
    }

    #[test]
    fn test_out_of_order_boundary_fails_without_side_effects() {
        let t0 = Instant::now();
        let mut ts = TimeStat::new(10);

        assert!(matches!(
            ts.mark_data_done_at(t0),
            Err(Error::PhaseOrder { phase: Phase::Idle, .. })
        ));

        ts.epoch_begin_at(1, t0).unwrap();
        assert!(matches!(
            ts.mark_forward_done_at(t0 + ms(5)),
            Err(Error::PhaseOrder { phase: Phase::DataLoading, .. })
        ));
        assert_eq!(ts.forward_elapsed(), Duration::ZERO);
        assert_eq!(ts.phase(), Phase::DataLoading);

        // Segment start was not moved by the rejected call
        ts.mark_data_done_at(t0 + ms(8)).unwrap();
        assert_eq!(ts.data_elapsed(), ms(8));
    }

    #[test]
    fn test_epoch_end_mid_iteration_is_rejected() {
        let t0 = Instant::now();
        let mut ts = TimeStat::new(10);
        ts.epoch_begin_at(1, t0).unwrap();
        ts.mark_data_done_at(t0 + ms(1)).unwrap();
        assert!(ts.epoch_end_at(t0 + ms(2)).is_err());
        assert!(ts.format_report().is_err());
    }

    #[test]
    fn test_report_folds_averages() {
        let t0 = Instant::now();
        let mut ts = TimeStat::new(2);

        for (epoch, data_ms) in [(1usize, 100u64), (2, 300)] {
            let start = t0 + ms(epoch as u64 * 10_000);
            ts.epoch_begin_at(epoch, start).unwrap();
            ts.mark_data_done_at(start + ms(data_ms)).unwrap();
            ts.mark_forward_done_at(start + ms(data_ms + 1000)).unwrap();
            ts.mark_visualize_done_at(start + ms(data_ms + 1000)).unwrap();
            ts.epoch_end_at(start + ms(data_ms + 1000)).unwrap();

            let report = ts.format_report().unwrap();
            assert!(report.starts_with(&format!("End of epoch {epoch} / 2 \tTime Taken: data")));
            assert!(report.contains(&format!("\nEpoch {epoch} completes in ")));
            assert_eq!(ts.phase(), Phase::Idle);
        }

        assert!((ts.data_time_avg().unwrap() - 0.2).abs() < 1e-9);
        assert!((ts.forward_time_avg().unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(ts.last_epoch().unwrap().epoch, 2);
        assert!((ts.last_epoch().unwrap().epoch_time - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_report_only_once_per_epoch() {
        let t0 = Instant::now();
        let mut ts = TimeStat::new(1);
        ts.epoch_begin_at(1, t0).unwrap();
        ts.epoch_end_at(t0 + ms(5)).unwrap();
        ts.format_report().unwrap();
        assert!(matches!(ts.format_report(), Err(Error::PhaseOrder { .. })));
    }

    #[test]
    fn test_new_epoch_after_end_without_report() {
        let t0 = Instant::now();
        let mut ts = TimeStat::new(3);
        ts.epoch_begin_at(1, t0).unwrap();
        ts.mark_data_done_at(t0 + ms(4)).unwrap();
        ts.mark_forward_done_at(t0 + ms(6)).unwrap();
        ts.mark_visualize_done_at(t0 + ms(7)).unwrap();
        ts.epoch_end_at(t0 + ms(7)).unwrap();

        ts.epoch_begin_at(2, t0 + ms(10)).unwrap();
        assert_eq!(ts.data_elapsed(), Duration::ZERO);
        assert_eq!(ts.epoch_elapsed(), None);
    }
}
