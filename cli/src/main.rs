//! Provisio CLI - remote provisioning for freshly built machine images

use clap::Parser;
use tracing_subscriber::EnvFilter;

use provisio::application::{CancelHandle, cancellation};
use provisio::cli::Cli;
use provisio::domain::ProvisionError;

/// Exit status after an interrupted run (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("provisio={level}"))),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Cancel the run on SIGINT (Ctrl-C).
async fn cancel_on_interrupt(handle: CancelHandle) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        return;
    }
    tracing::info!("received interrupt, cancelling");
    handle.cancel();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (handle, cancel) = cancellation();
    tokio::spawn(cancel_on_interrupt(handle));

    if let Err(e) = cli.run(&cancel).await {
        eprintln!("Error: {e:#}");
        let interrupted = e
            .downcast_ref::<ProvisionError>()
            .is_some_and(ProvisionError::is_cancelled);
        std::process::exit(if interrupted { EXIT_INTERRUPTED } else { 1 });
    }
}
