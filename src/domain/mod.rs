// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain data and traits. No file I/O here.

/// Prediction records and the batch outputs they are built from
pub mod prediction;

/// The default sample descriptor
pub mod sample;

/// Sample and renderer abstractions
pub mod traits;
