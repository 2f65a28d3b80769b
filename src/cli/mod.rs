// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and dispatches to the use cases.
// Printing happens here; the use cases only return values.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, SnapshotArgs, VisualizeArgs};

use crate::application::{
    snapshot_use_case::SnapshotUseCase,
    visualize_use_case::VisualizeUseCase,
};
use crate::infra::overlay_renderer::VertexOverlayRenderer;

#[derive(Parser, Debug)]
#[command(
    name = "pose-eval",
    version,
    about = "Inspect, deduplicate and visualize saved pose-estimation results."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Visualize(args) => self.run_visualize(args),
            Commands::Dedup(args)     => self.run_dedup(args),
            Commands::Summary(args)   => self.run_summary(args),
        }
    }

    /// Renders every stored result next to its source image.
    fn run_visualize(&self, args: &VisualizeArgs) -> Result<()> {
        tracing::info!("Visualizing results in: {}", args.eval_dir.display());

        let use_case = VisualizeUseCase::new(args.into(), VertexOverlayRenderer::default());
        let report   = use_case.execute()?;

        println!(
            "Rendered {} of {} results.",
            report.succeeded,
            report.total()
        );
        for f in &report.failures {
            println!("  failed {}: {}", f.label, f.error);
        }
        Ok(())
    }

    /// Drops repeated samples from the snapshot and rewrites it.
    fn run_dedup(&self, args: &SnapshotArgs) -> Result<()> {
        let (before, after) = SnapshotUseCase::new(args.into()).dedup()?;
        println!("Number of test data: {after} (was {before})");
        Ok(())
    }

    fn run_summary(&self, args: &SnapshotArgs) -> Result<()> {
        let summary = SnapshotUseCase::new(args.into()).summary()?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}
