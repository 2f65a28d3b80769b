// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflows over a saved evaluation directory. They coordinate
// the eval and infra layers; the CLI only routes to them.

/// Render comparison images for every saved prediction
pub mod visualize_use_case;

/// Deduplicate or summarise a saved snapshot
pub mod snapshot_use_case;
