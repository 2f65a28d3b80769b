// ============================================================
// Layer 5 — Loss Statistics
// ============================================================
// Running averages of the loss terms reported by the training
// loop, rendered as a tab-separated status block.
//
// Two terms are always present (total and 2D keypoint loss).
// The others depend on which supervision a run enables; each
// one joins the report the first time an update carries it and
// stays there for the rest of the run.
//
// Example report (iteration 40 of 1000, dense-pose loss active):
//   Epoch:[3][40/1000]	Total Loss 0.8123(0.9011)	Joints 2D Loss 0.4000(0.4521)
//   Epoch:[3][40/1000]	Densepose Align Loss 0.1200(0.1350)

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::train::average_meter::AverageMeter;

// ─── LossTerm ─────────────────────────────────────────────────────────────────
/// The loss terms in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LossTerm {
    Total,
    Joints2d,
    DpAlign,
    SmplJoints,
    SmplParams,
}

impl LossTerm {
    pub const ALL: [LossTerm; 5] = [
        LossTerm::Total,
        LossTerm::Joints2d,
        LossTerm::DpAlign,
        LossTerm::SmplJoints,
        LossTerm::SmplParams,
    ];

    /// Name of the term in the loss mapping produced by the model.
    pub fn key(self) -> &'static str {
        match self {
            LossTerm::Total      => "total_loss",
            LossTerm::Joints2d   => "kp_loss",
            LossTerm::DpAlign    => "dp_align_loss",
            LossTerm::SmplJoints => "smpl_joints_loss",
            LossTerm::SmplParams => "smpl_params_loss",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LossTerm::Total      => "Total Loss",
            LossTerm::Joints2d   => "Joints 2D Loss",
            LossTerm::DpAlign    => "Densepose Align Loss",
            LossTerm::SmplJoints => "SMPL joints Loss",
            LossTerm::SmplParams => "SMPL Params Loss",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, LossTerm::Total | LossTerm::Joints2d)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

// ─── LossValues ───────────────────────────────────────────────────────────────
/// One iteration's loss values. Always carries the required terms.
#[derive(Debug, Clone, PartialEq)]
pub struct LossValues {
    values: BTreeMap<LossTerm, f64>,
}

impl LossValues {
    pub fn new(total_loss: f64, kp_loss: f64) -> Self {
        let mut values = BTreeMap::new();
        values.insert(LossTerm::Total, total_loss);
        values.insert(LossTerm::Joints2d, kp_loss);
        Self { values }
    }

    /// Add (or overwrite) a term.
    pub fn with(mut self, term: LossTerm, value: f64) -> Self {
        self.values.insert(term, value);
        self
    }

    /// Parse a name → value mapping. Fails if a required term is absent;
    /// unrecognised names are skipped with a warning.
    pub fn from_map(map: &HashMap<String, f64>) -> Result<Self> {
        let mut values = BTreeMap::new();
        for (name, &v) in map {
            match LossTerm::from_key(name) {
                Some(term) => {
                    values.insert(term, v);
                }
                None => tracing::warn!("Ignoring unknown loss term '{}'", name),
            }
        }

        for term in LossTerm::ALL.into_iter().filter(|t| t.is_required()) {
            if !values.contains_key(&term) {
                return Err(Error::MissingMetric(term.key().to_string()));
            }
        }
        Ok(Self { values })
    }

    pub fn get(&self, term: LossTerm) -> Option<f64> {
        self.values.get(&term).copied()
    }
}

// ─── LossStat ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct LossStat {
    meters:    BTreeMap<LossTerm, AverageMeter>,
    activated: BTreeSet<LossTerm>,
    num_data:  usize,
    epoch:     Option<usize>,
}

impl LossStat {
    /// `num_data` is the iteration count printed as the denominator.
    pub fn new(num_data: usize) -> Self {
        Self {
            meters:    LossTerm::ALL.into_iter().map(|t| (t, AverageMeter::new())).collect(),
            activated: BTreeSet::new(),
            num_data,
            epoch:     None,
        }
    }

    pub fn set_epoch(&mut self, epoch: usize) {
        self.epoch = Some(epoch);
    }

    pub fn epoch(&self) -> Option<usize> {
        self.epoch
    }

    pub fn update(&mut self, values: &LossValues) {
        for (&term, &v) in &values.values {
            if let Some(meter) = self.meters.get_mut(&term) {
                meter.update(v);
            }
            if !term.is_required() && self.activated.insert(term) {
                tracing::debug!("Loss term '{}' activated", term.key());
            }
        }
    }

    /// Update from a name → value mapping, as produced by the model.
    pub fn update_from_map(&mut self, map: &HashMap<String, f64>) -> Result<()> {
        let values = LossValues::from_map(map)?;
        self.update(&values);
        Ok(())
    }

    pub fn is_active(&self, term: LossTerm) -> bool {
        term.is_required() || self.activated.contains(&term)
    }

    /// Optional terms seen so far, in report order.
    pub fn active_terms(&self) -> impl Iterator<Item = LossTerm> + '_ {
        self.activated.iter().copied()
    }

    pub fn average(&self, term: LossTerm) -> Option<f64> {
        self.meters.get(&term).and_then(AverageMeter::avg)
    }

    pub fn meter(&self, term: LossTerm) -> Option<&AverageMeter> {
        self.meters.get(&term)
    }

    pub fn format_report(&self, iteration: usize, total: usize) -> Result<String> {
        let epoch  = self.epoch.ok_or(Error::MissingContext("epoch not set"))?;
        let prefix = format!("Epoch:[{epoch}][{iteration}/{total}]\t");

        let mut out = prefix.clone();
        for term in [LossTerm::Total, LossTerm::Joints2d] {
            out.push_str(&self.entry(term).ok_or(Error::NoData("no loss update recorded"))?);
        }

        for term in self.active_terms() {
            if let Some(entry) = self.entry(term) {
                out.push('\n');
                out.push_str(&prefix);
                out.push_str(&entry);
            }
        }
        Ok(out)
    }

    /// Print the report for `iteration` out of `num_data`.
    pub fn print_report(&self, iteration: usize) -> Result<()> {
        println!("{}", self.format_report(iteration, self.num_data)?);
        Ok(())
    }

    fn entry(&self, term: LossTerm) -> Option<String> {
        let meter = self.meters.get(&term)?;
        Some(format!(
            "{} {:.4}({:.4})\t",
            term.label(),
            meter.val()?,
            meter.avg()?,
        ))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_average_is_mean() {
        let mut stat = LossStat::new(100);
        let totals   = [0.9, 0.7, 0.5, 0.3];
        for (i, &t) in totals.iter().enumerate() {
            stat.update(&LossValues::new(t, i as f64));
        }
        let mean = totals.iter().sum::<f64>() / totals.len() as f64;
        assert!((stat.average(LossTerm::Total).unwrap() - mean).abs() < 1e-12);
        assert_eq!(stat.average(LossTerm::Joints2d), Some(1.5));
    }

    #[test]
    fn test_report_format() {
        let mut stat = LossStat::new(1000);
        stat.set_epoch(3);
        stat.update(&LossValues::new(1.0, 0.5));
        stat.update(&LossValues::new(0.5, 0.25));

        let report = stat.format_report(40, 1000).unwrap();
        assert_eq!(
            report,
            "Epoch:[3][40/1000]\tTotal Loss 0.5000(0.7500)\tJoints 2D Loss 0.2500(0.3750)\t"
        );
    }

    #[test]
    fn test_optional_term_activates_late() {
        let mut stat = LossStat::new(10);
        stat.set_epoch(0);

        for _ in 0..3 {
            stat.update(&LossValues::new(1.0, 1.0));
        }
        let before = stat.format_report(3, 10).unwrap();
        assert!(!before.contains("Densepose"));

        stat.update(&LossValues::new(1.0, 1.0).with(LossTerm::DpAlign, 0.2));
        stat.update(&LossValues::new(1.0, 1.0).with(LossTerm::DpAlign, 0.4));

        let after = stat.format_report(5, 10).unwrap();
        assert!(after.contains("\nEpoch:[0][5/10]\tDensepose Align Loss 0.4000(0.3000)\t"));
        // Average only covers the two updates that carried it
        assert!((stat.average(LossTerm::DpAlign).unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_activation_is_sticky() {
        let mut stat = LossStat::new(10);
        stat.set_epoch(1);
        stat.update(&LossValues::new(1.0, 1.0).with(LossTerm::SmplParams, 0.1));
        stat.update(&LossValues::new(1.0, 1.0));

        assert!(stat.is_active(LossTerm::SmplParams));
        assert!(stat.format_report(2, 10).unwrap().contains("SMPL Params Loss 0.1000(0.1000)"));
    }

    #[test]
    fn test_optional_lines_follow_declared_order() {
        let mut stat = LossStat::new(10);
        stat.set_epoch(1);
        stat.update(&LossValues::new(1.0, 1.0).with(LossTerm::SmplParams, 0.1));
        stat.update(&LossValues::new(1.0, 1.0).with(LossTerm::DpAlign, 0.2));

        let report = stat.format_report(2, 10).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("Densepose Align Loss"));
        assert!(lines[2].contains("SMPL Params Loss"));
    }

    #[test]
    fn test_update_from_map_requires_required_terms() {
        let mut stat = LossStat::new(10);
        let mut map  = HashMap::new();
        map.insert("total_loss".to_string(), 1.0);

        assert!(matches!(
            stat.update_from_map(&map),
            Err(Error::MissingMetric(name)) if name == "kp_loss"
        ));
        assert_eq!(stat.average(LossTerm::Total), None);
    }

    #[test]
    fn test_update_from_map_with_optional_and_unknown() {
        let mut stat = LossStat::new(10);
        let map: HashMap<String, f64> = [
            ("total_loss", 2.0),
            ("kp_loss", 1.0),
            ("smpl_joints_loss", 0.5),
            ("something_else", 9.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        stat.update_from_map(&map).unwrap();
        assert!(stat.is_active(LossTerm::SmplJoints));
        assert!(!stat.is_active(LossTerm::DpAlign));
        assert_eq!(stat.average(LossTerm::SmplJoints), Some(0.5));
    }

    #[test]
    fn test_report_needs_epoch_and_data() {
        let mut stat = LossStat::new(10);
        assert!(matches!(stat.format_report(0, 10), Err(Error::MissingContext(_))));
        stat.set_epoch(1);
        assert!(matches!(stat.format_report(0, 10), Err(Error::NoData(_))));
    }
}
