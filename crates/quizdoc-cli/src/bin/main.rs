//! quizdoc binary entry point
//!
//! Installs the stderr log subscriber and hands over to `run_cli()`.

use anyhow::Result;
use quizdoc_cli::run_cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run_cli()
}
