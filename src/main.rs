use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use tcpsweep::cli::Args;
use tcpsweep::error::ScanError;
use tcpsweep::output::{self, ScanReport};
use tcpsweep::scanner::PortScanner;
use tcpsweep::types::{expand_targets, PortSpec};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize tracing based on verbosity
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Pre-flight: all configuration errors surface here as ScanError,
    // before any network activity
    let policy = args.timing_policy()?;
    let ports: PortSpec = args.ports.parse().map_err(ScanError::InvalidPorts)?;
    let targets = expand_targets(&args.targets)
        .await
        .map_err(ScanError::InvalidTarget)?;

    if targets.is_empty() {
        return Err(ScanError::NoTargets.into());
    }

    let scanner = Arc::new(PortScanner::new(policy.clone()));

    // Signal wiring is external to the engine: ctrl-c cancels, then the
    // scan returns with whatever it collected
    let canceller = Arc::clone(&scanner);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n[!] Shutting down gracefully... Please wait.");
            canceller.cancel();
        }
    });

    output::print_scan_info(&targets, ports.ports(), &policy);

    let started = Instant::now();
    let results = scanner.scan(&targets, ports.ports()).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    let report = ScanReport {
        policy: &policy,
        targets_scanned: targets.len(),
        ports_per_target: ports.len(),
        duration_ms,
        interrupted: scanner.is_cancelled(),
        results: &results,
    };
    output::print_report(&report, args.output, args.show_closed)?;

    // 130 = interrupted, the conventional SIGINT exit status
    if scanner.is_cancelled() {
        return Ok(ExitCode::from(130));
    }
    Ok(ExitCode::SUCCESS)
}
