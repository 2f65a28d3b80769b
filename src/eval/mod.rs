// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Collects model predictions during an evaluation pass.
//
//   result_store.rs — accumulate per-batch predictions, drop
//                     duplicates of the same source sample, and
//                     save/restore the whole set as a snapshot

/// Accumulates, deduplicates and persists prediction records
pub mod result_store;

pub use result_store::ResultStore;
