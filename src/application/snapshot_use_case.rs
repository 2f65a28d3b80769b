// ============================================================
// Layer 2 — SnapshotUseCase
// ============================================================
// Maintenance operations on a saved evaluation snapshot:
//
//   dedup   → load, keep the first record per sample, save back
//   summary → report record / sample / distinct-key counts

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::visualize_use_case::EvalConfig;
use crate::domain::sample::Sample;
use crate::eval::ResultStore;

/// Counts describing one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub records:       usize,
    pub distinct_keys: usize,
    pub samples:       usize,
}

pub struct SnapshotUseCase {
    config: EvalConfig,
}

impl SnapshotUseCase {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    fn load(&self) -> Result<ResultStore<Sample>> {
        let path = self.config.snapshot_path();
        ResultStore::from_snapshot(&path)
            .with_context(|| format!("Cannot load snapshot '{}'", path.display()))
    }

    /// Deduplicate the snapshot in place. Returns (before, after) counts.
    pub fn dedup(&self) -> Result<(usize, usize)> {
        let mut store = self.load()?;
        let before    = store.len();
        let after     = store.deduplicate()?;

        let path = self.config.snapshot_path();
        store
            .save(&path)
            .with_context(|| format!("Cannot write snapshot '{}'", path.display()))?;

        tracing::info!("Removed {} duplicate predictions", before - after);
        Ok((before, after))
    }

    pub fn summary(&self) -> Result<SnapshotSummary> {
        let store = self.load()?;
        Ok(SnapshotSummary {
            records:       store.len(),
            distinct_keys: store.distinct_keys()?,
            samples:       store.samples().len(),
        })
    }
}
