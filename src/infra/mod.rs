// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
//   snapshot.rs          — versioned on-disk format of a
//                          ResultStore, written atomically
//   image_io.rs          — load / pad / resize / concat / save
//   overlay_renderer.rs  — projects predicted vertices onto
//                          the input image
//   worker_pool.rs       — bounded rayon fan-out returning a
//                          per-unit success/failure report
//   metrics.rs           — per-epoch CSV log of loss and timing

/// Snapshot encoding and atomic file replacement
pub mod snapshot;

/// Image reading, padding and writing
pub mod image_io;

/// Weak-perspective vertex overlay renderer
pub mod overlay_renderer;

/// Bounded worker pool with joined results
pub mod worker_pool;

/// Epoch metrics CSV logger
pub mod metrics;
