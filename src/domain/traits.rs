// ============================================================
// Layer 3 — Collaborator Traits
// ============================================================
// The evaluator depends on two outside collaborators:
//
//   SampleDescriptor → an entry of the external sample list
//   Renderer         → turns a prediction into an overlay image
//
// Both are traits so the store and the visualization workflow
// work with any dataset format and any rendering backend.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::domain::prediction::PredictionRecord;
use crate::error::Result;

// ─── SampleDescriptor ─────────────────────────────────────────────────────────
/// An entry of the sample list a `ResultStore` resolves indices into.
pub trait SampleDescriptor {
    /// Key used to deduplicate records that refer to the same sample.
    fn identity_key(&self) -> String;

    /// Directory (relative to the result root) where this sample's
    /// rendered output is written.
    fn storage_subpath(&self) -> PathBuf;

    /// Location of the source image.
    fn image_path(&self) -> &Path;
}

// ─── Renderer ─────────────────────────────────────────────────────────────────
/// Produces a rendering of one prediction on top of its input image.
///
/// Called concurrently from the visualization pool, hence `Sync`.
pub trait Renderer: Send + Sync {
    /// `image` is already padded and resized to the working size.
    fn render(&self, image: &RgbImage, record: &PredictionRecord) -> Result<RgbImage>;
}
