//! `ceremony` - Timed reveal-and-reward sequencing for awards ceremonies

use clap::Parser;

use ceremony::cli::args::{Cli, OutputFormat};
use ceremony::cli::commands::{self, Shutdown};
use ceremony::error::ExitCode;
use ceremony::observability::{EndReason, LogFormat, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        let format = match cli.log_format {
            OutputFormat::Human => LogFormat::Human,
            OutputFormat::Json => LogFormat::Json,
        };
        init_logging(format, cli.verbose, cli.color);
    }

    // Spawn signal handler for graceful shutdown
    let shutdown = Shutdown::new();
    let signals = shutdown.clone();
    tokio::spawn(async move {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to register SIGTERM handler");
                    if tokio::signal::ctrl_c().await.is_ok() {
                        signals.trigger(EndReason::Interrupted);
                    }
                    return;
                }
            };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => signals.trigger(EndReason::Interrupted),
            _ = sigterm.recv() => signals.trigger(EndReason::Terminated),
        }

        eprintln!("\nShutting down gracefully... (press Ctrl+C again to force)");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
            _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
        }
    });

    let result = commands::dispatch(cli, shutdown).await;

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
