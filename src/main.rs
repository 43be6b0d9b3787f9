//! Draftsman
//!
//! Model relationship graphs and editor settings for the Draftsman visual
//! editor.
//!
//! JSON goes to stdout; logs go to stderr. `RUST_LOG` overrides the level
//! chosen by `-v`.

use clap::Parser;
use draftsman_cli::Cli;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("{} {}", draftsman_cli::NAME, draftsman_cli::VERSION);
    let code = draftsman_cli::run(&cli)?;
    std::process::exit(code);
}
