use std::process::ExitCode;

use clap::Parser;
use tracing::{subscriber, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use withaws::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match cli.execute().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG wins over -v; SDK crates stay at warn otherwise
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,withaws={level}")));

    // stdout belongs to the nested command and to `env` output
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 1)
        .with_file(verbose >= 2)
        .with_line_number(verbose >= 2)
        .compact()
        .finish();

    subscriber::set_global_default(subscriber)?;

    Ok(())
}
