use anyhow::Result;
use clap::Parser;
use pose_eval_utils::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pose_eval_utils=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
