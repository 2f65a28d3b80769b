// ============================================================
// Layer 5 — ResultStore
// ============================================================
// Accumulates prediction records keyed by an index into the
// sample list it was built with.
//
// Typical cycle:
//   for each batch  → update(indices, outputs)
//   once at the end → deduplicate()
//                     save(path)
//   later / elsewhere → load(path) or from_snapshot(path)
//
// Samples can appear more than once across batches (e.g. when
// the loader pads the last batch). deduplicate() keeps the first
// record per identity key and preserves insertion order.
//
// Not synchronized: one owner mutates it at a time.

use std::collections::HashSet;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::domain::prediction::{BatchOutputs, PredictionRecord, CAM_DIM, POSE_DIM, SHAPE_DIM};
use crate::domain::traits::SampleDescriptor;
use crate::error::{Error, Result};
use crate::infra::snapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct ResultStore<S> {
    /// Deep copy of the external sample list taken at construction
    samples: Vec<S>,
    records: Vec<PredictionRecord>,
}

impl<S> Default for ResultStore<S> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S> ResultStore<S> {
    /// A store with no samples, meant to be filled by `load`.
    pub fn empty() -> Self {
        Self { samples: Vec::new(), records: Vec::new() }
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn samples(&self) -> &[S] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record. The sample list is kept.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Append one record per batch position.
    ///
    /// Every field of `outputs` must have one row per index, and the
    /// parameter rows must have their fixed widths. Nothing is
    /// appended if any check fails.
    pub fn update(&mut self, batch_indices: &[usize], outputs: &BatchOutputs) -> Result<()> {
        let n = batch_indices.len();
        check_rows("cams",         n, outputs.cams.len())?;
        check_rows("shape_params", n, outputs.shape_params.len())?;
        check_rows("pose_params",  n, outputs.pose_params.len())?;
        check_rows("pred_verts",   n, outputs.pred_verts.len())?;

        for i in 0..n {
            check_rows("cams",         CAM_DIM,   outputs.cams[i].len())?;
            check_rows("shape_params", SHAPE_DIM, outputs.shape_params[i].len())?;
            check_rows("pose_params",  POSE_DIM,  outputs.pose_params[i].len())?;
        }

        self.records.reserve(n);
        for (i, &data_index) in batch_indices.iter().enumerate() {
            self.records.push(PredictionRecord::new(
                data_index,
                &outputs.cams[i],
                &outputs.shape_params[i],
                &outputs.pose_params[i],
                &outputs.pred_verts[i],
            ));
        }

        tracing::debug!("Stored {} predictions ({} total)", n, self.records.len());
        Ok(())
    }
}

impl<S: Clone> ResultStore<S> {
    /// Build a store over a deep copy of `samples`.
    pub fn new(samples: &[S]) -> Self {
        Self { samples: samples.to_vec(), records: Vec::new() }
    }
}

impl<S: SampleDescriptor> ResultStore<S> {
    /// Resolve a record's index into its sample.
    pub fn sample_for(&self, record: &PredictionRecord) -> Result<&S> {
        self.samples.get(record.data_index).ok_or(Error::IndexOutOfRange {
            index: record.data_index,
            len:   self.samples.len(),
        })
    }

    /// Keep only the first record per identity key, in original order.
    /// Returns the number of records left.
    pub fn deduplicate(&mut self) -> Result<usize> {
        // Resolve every key before touching the records so a bad
        // index leaves the store as it was.
        let keys = self
            .records
            .iter()
            .map(|r| self.sample_for(r).map(|s| s.identity_key()))
            .collect::<Result<Vec<_>>>()?;

        let mut seen = HashSet::with_capacity(keys.len());
        let mut keep = keys.into_iter().map(|k| seen.insert(k));
        self.records.retain(|_| keep.next().unwrap_or(false));

        tracing::info!("Number of test data: {}", self.records.len());
        Ok(self.records.len())
    }

    /// Number of distinct identity keys among the current records.
    pub fn distinct_keys(&self) -> Result<usize> {
        let mut seen = HashSet::new();
        for r in &self.records {
            seen.insert(self.sample_for(r)?.identity_key());
        }
        Ok(seen.len())
    }
}

impl<S: Serialize + DeserializeOwned> ResultStore<S> {
    /// Persist the sample list and all records to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        snapshot::write(path, &self.samples, &self.records)?;
        tracing::info!("Saved {} predictions to '{}'", self.records.len(), path.display());
        Ok(())
    }

    /// Replace the sample list and records with the contents of `path`.
    /// On error the store is left unchanged.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (samples, records) = snapshot::read(path)?;
        self.samples = samples;
        self.records = records;
        tracing::info!("Loaded {} predictions from '{}'", self.records.len(), path.display());
        Ok(())
    }

    pub fn from_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let mut store = Self::empty();
        store.load(path)?;
        Ok(store)
    }
}

fn check_rows(field: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::ShapeMismatch { field, expected, actual })
    }
}
