use anyhow::Result;
use bounded_fanout::cli::{execute_fetch, execute_scan, execute_simulate, exit_code, Cli, Commands};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    // RUST_LOG 未指定なら info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let summary = match cli.command {
        Commands::Simulate {
            durations,
            dispatch,
        } => execute_simulate(&durations, &dispatch).await?,
        Commands::Fetch {
            urls,
            request_timeout_ms,
            dispatch,
        } => execute_fetch(&urls, Duration::from_millis(request_timeout_ms), &dispatch).await?,
        Commands::Scan {
            target_directory,
            extensions,
            dispatch,
        } => execute_scan(&target_directory, &extensions, &dispatch).await?,
    };

    let code = exit_code(&summary);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
