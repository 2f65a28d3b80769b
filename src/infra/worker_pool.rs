// ============================================================
// Layer 6 — Worker Pool
// ============================================================
// Runs independent units of work on a bounded rayon pool and
// joins every outcome into a single WorkReport. A failing unit
// never aborts the others and is never dropped silently.

use std::fmt::Display;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A unit of work that failed, identified by its caller-chosen label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkFailure {
    pub label: String,
    pub error: String,
}

/// Outcome of a whole fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkReport {
    pub succeeded: usize,
    pub failures:  Vec<WorkFailure>,
}

impl WorkReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct WorkerPool {
    pool:    rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Build a pool of `workers` threads (at least one).
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pose-eval-worker-{i}"))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `work` on every item and block until all have finished.
    ///
    /// `label` names an item in failure entries. Failures are listed in
    /// input order.
    pub fn run<T, L, F, E>(&self, items: &[T], label: L, work: F) -> WorkReport
    where
        T: Sync,
        L: Fn(&T) -> String + Sync,
        F: Fn(&T) -> std::result::Result<(), E> + Sync,
        E: Display,
    {
        let total = items.len();
        let outcomes: Vec<Option<WorkFailure>> = self.pool.install(|| {
            items
                .par_iter()
                .enumerate()
                .map(|(i, item)| {
                    let outcome = work(item).err().map(|e| WorkFailure {
                        label: label(item),
                        error: e.to_string(),
                    });
                    if i % 10 == 0 {
                        tracing::info!(
                            "worker {:?} processed {}/{}",
                            rayon::current_thread_index(),
                            i,
                            total,
                        );
                    }
                    outcome
                })
                .collect()
        });

        let failures: Vec<WorkFailure> = outcomes.into_iter().flatten().collect();
        for f in &failures {
            tracing::warn!("'{}' failed: {}", f.label, f.error);
        }

        WorkReport {
            succeeded: total - failures.len(),
            failures,
        }
    }
}
