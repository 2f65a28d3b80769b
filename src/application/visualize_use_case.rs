// ============================================================
// Layer 2 — VisualizeUseCase
// ============================================================
// Renders a side-by-side comparison for every record of a saved
// evaluation snapshot:
//
//   Step 1: Restore the snapshot                 (Layer 5 - eval)
//   Step 2: Renew the result directory
//   Step 3: Assign each record a distinct output file and
//           create every output directory
//   Step 4: Fan records out over the worker pool (Layer 6 - infra)
//           load → pad/resize → render → [input | overlay] → save
//   Step 5: Join all outcomes into a WorkReport
//
// Output layout:
//   <eval_dir>/images/<storage_subpath>/<image file name>

use std::collections::{hash_map::Entry, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{
    prediction::PredictionRecord,
    sample::Sample,
    traits::{Renderer, SampleDescriptor},
};
use crate::eval::ResultStore;
use crate::infra::{
    image_io,
    worker_pool::{WorkFailure, WorkReport, WorkerPool},
};

// ─── Evaluation Configuration ────────────────────────────────────────────────
// Every path the workflow touches is derived from here; nothing
// reads a global result directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    pub eval_dir:      PathBuf,
    pub snapshot_file: String,
    pub images_dir:    String,
    pub workers:       usize,
    pub image_size:    u32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            eval_dir:      PathBuf::from("evaluate_results"),
            snapshot_file: "eval_result.snap".to_string(),
            images_dir:    "images".to_string(),
            workers:       8,
            image_size:    224,
        }
    }
}

impl EvalConfig {
    pub fn snapshot_path(&self) -> PathBuf {
        self.eval_dir.join(&self.snapshot_file)
    }

    pub fn res_dir(&self) -> PathBuf {
        self.eval_dir.join(&self.images_dir)
    }

    /// Write the effective configuration next to the results.
    pub fn save(&self) -> Result<()> {
        let path = self.eval_dir.join("visualize_config.json");
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved visualize config to '{}'", path.display());
        Ok(())
    }
}

// ─── VisualizeUseCase ─────────────────────────────────────────────────────────
pub struct VisualizeUseCase<R> {
    config:   EvalConfig,
    renderer: R,
}

impl<R: Renderer> VisualizeUseCase<R> {
    pub fn new(config: EvalConfig, renderer: R) -> Self {
        Self { config, renderer }
    }

    pub fn execute(&self) -> Result<WorkReport> {
        let cfg = &self.config;

        let snapshot = cfg.snapshot_path();
        let store    = ResultStore::<Sample>::from_snapshot(&snapshot)
            .with_context(|| format!("Cannot restore results from '{}'", snapshot.display()))?;
        tracing::info!("Restored {} predictions", store.len());

        let res_dir = cfg.res_dir();
        renew_dir(&res_dir)?;
        cfg.save()?;

        visualize_store(&store, &res_dir, &self.renderer, cfg.workers, cfg.image_size)
    }
}

/// Render every record of `store` into `res_dir`.
pub fn visualize_store<S, R>(
    store:      &ResultStore<S>,
    res_dir:    &Path,
    renderer:   &R,
    workers:    usize,
    image_size: u32,
) -> Result<WorkReport>
where
    S: SampleDescriptor + Sync,
    R: Renderer,
{
    let (jobs, skipped) = plan_outputs(store, res_dir);
    build_dirs(&jobs)?;

    let workers = workers.min(jobs.len()).max(1);
    let pool    = WorkerPool::new(workers)?;
    tracing::info!("Rendering {} results with {} workers", jobs.len(), workers);

    let mut report = pool.run(
        &jobs,
        |job| format!("data_idx {}", job.record.data_index),
        |job| render_one(job, renderer, image_size),
    );
    report.failures.splice(0..0, skipped);

    tracing::info!(
        "Rendered {}/{} results ({} failed)",
        report.succeeded,
        report.total(),
        report.failures.len(),
    );
    Ok(report)
}

/// Remove `dir` if present and recreate it empty.
pub fn renew_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("Cannot clear '{}'", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("Cannot create '{}'", dir.display()))?;
    Ok(())
}

/// One record with the file it renders to.
struct RenderJob<'a, S> {
    record:   &'a PredictionRecord,
    sample:   &'a S,
    out_path: PathBuf,
}

/// Assign every record a distinct output path before any worker runs.
///
/// Samples with different identity keys but the same subpath and file
/// name get `_<data_index>` appended to the file stem. A second record
/// for an already planned identity key, or one whose index does not
/// resolve, becomes a failure instead of a job.
fn plan_outputs<'a, S: SampleDescriptor>(
    store:   &'a ResultStore<S>,
    res_dir: &Path,
) -> (Vec<RenderJob<'a, S>>, Vec<WorkFailure>) {
    let mut jobs     = Vec::with_capacity(store.len());
    let mut failures = Vec::new();
    let mut keys:  HashMap<String, usize> = HashMap::new();
    let mut paths: HashSet<PathBuf>       = HashSet::new();

    for record in store.records() {
        let label  = format!("data_idx {}", record.data_index);
        let sample = match store.sample_for(record) {
            Ok(s) => s,
            Err(e) => {
                failures.push(WorkFailure { label, error: e.to_string() });
                continue;
            }
        };

        match keys.entry(sample.identity_key()) {
            Entry::Occupied(first) => {
                failures.push(WorkFailure {
                    label,
                    error: format!("duplicate of data_idx {}, output skipped", first.get()),
                });
                continue;
            }
            Entry::Vacant(slot) => {
                slot.insert(record.data_index);
            }
        }

        let dir       = res_dir.join(sample.storage_subpath());
        let file_name = sample
            .image_path()
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("{}.png", record.data_index)));

        let mut out_path = dir.join(&file_name);
        if paths.contains(&out_path) {
            out_path = dir.join(indexed_name(&file_name, record.data_index));
        }
        if !paths.insert(out_path.clone()) {
            failures.push(WorkFailure {
                label,
                error: format!("output path '{}' already taken", out_path.display()),
            });
            continue;
        }

        jobs.push(RenderJob { record, sample, out_path });
    }

    (jobs, failures)
}

/// `0001.png` with index 7 → `0001_7.png`.
fn indexed_name(file_name: &Path, data_index: usize) -> PathBuf {
    let stem = file_name.file_stem().unwrap_or_default().to_string_lossy();
    match file_name.extension() {
        Some(ext) => PathBuf::from(format!("{stem}_{data_index}.{}", ext.to_string_lossy())),
        None      => PathBuf::from(format!("{stem}_{data_index}")),
    }
}

/// Create every output directory before the workers start.
fn build_dirs<S>(jobs: &[RenderJob<'_, S>]) -> Result<()> {
    let dirs: HashSet<&Path> = jobs.iter().filter_map(|j| j.out_path.parent()).collect();
    for dir in dirs {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;
    }
    Ok(())
}

fn render_one<S, R>(job: &RenderJob<'_, S>, renderer: &R, image_size: u32) -> crate::Result<()>
where
    S: SampleDescriptor,
    R: Renderer,
{
    let img     = image_io::pad_and_resize(&image_io::load_rgb(job.sample.image_path())?, image_size);
    let overlay = renderer.render(&img, job.record)?;
    let out     = image_io::hconcat(&[&img, &overlay]);

    image_io::save(&out, &job.out_path)?;
    tracing::debug!("Wrote '{}'", job.out_path.display());
    Ok(())
}
