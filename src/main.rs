//! debate-forge CLI entry point.
//!
//! Sets up tracing before dispatching to the CLI module. The log filter
//! comes from `RUST_LOG` when set, otherwise from `--log-level`
//! (default "info").

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = debate_forge::cli::parse_cli();

    let fallback_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_level.clone());

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&fallback_filter)),
        )
        .init();

    debate_forge::cli::run_with_cli(cli).await
}
