//! Output formatting module.
//!
//! Formats the aggregated scan results as a styled plain-text report or as
//! a JSON document. Display only: states and reasons are decided by the
//! scanner, never here.

use crate::scanner::{PortState, ScanResult};
use crate::timing::TimingPolicy;
use crate::types::{Port, ScanTarget};
use console::{style, Style};
use serde::Serialize;
use std::io::{self, Write};

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    Plain,
    /// Machine-readable JSON document.
    Json,
}

/// Full report handed to the formatter.
#[derive(Debug, Serialize)]
pub struct ScanReport<'a> {
    pub policy: &'a TimingPolicy,
    pub targets_scanned: usize,
    pub ports_per_target: usize,
    pub duration_ms: u64,
    pub interrupted: bool,
    pub results: &'a [ScanResult],
}

/// Print the pre-scan banner: what is about to be scanned and under which
/// policy.
pub fn print_scan_info(targets: &[ScanTarget], ports: &[Port], policy: &TimingPolicy) {
    eprintln!(
        "Scanning {} target(s), {} port(s) each [{}]",
        style(targets.len()).bold(),
        style(ports.len()).bold(),
        policy
    );
}

/// Format and print the report in the requested format.
pub fn print_report(report: &ScanReport<'_>, format: OutputFormat, show_closed: bool) -> io::Result<()> {
    match format {
        OutputFormat::Plain => print_plain(report, show_closed),
        OutputFormat::Json => print_json(report),
    }
}

fn state_style(state: PortState) -> Style {
    match state {
        PortState::Open => Style::new().green().bold(),
        PortState::Closed => Style::new().red(),
        PortState::Filtered | PortState::Timeout => Style::new().yellow(),
        PortState::Error | PortState::HostUnreachable | PortState::NetworkUnreachable => {
            Style::new().magenta()
        }
    }
}

/// Print the report in human-readable plain text.
fn print_plain(report: &ScanReport<'_>, show_closed: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    if report.interrupted {
        writeln!(
            out,
            "{}",
            style("!!! Scan was interrupted, results are partial").yellow().bold()
        )?;
        writeln!(out)?;
    }

    let mut open_count = 0usize;
    for result in report.results {
        if result.is_open() {
            open_count += 1;
        }
        if !show_closed && !result.is_open() {
            continue;
        }
        writeln!(
            out,
            "  {}:{} -> {} ({}ms) [{}]",
            result.host,
            result.port,
            state_style(result.state).apply_to(result.state),
            result.response_time_ms,
            result.reason
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {} {} result(s), {} open, {} target(s) in {:.2}s",
        style("Done:").bold(),
        report.results.len(),
        style(open_count).green().bold(),
        report.targets_scanned,
        report.duration_ms as f64 / 1000.0
    )?;

    Ok(())
}

/// Print the report as a JSON document.
fn print_json(report: &ScanReport<'_>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    println!("{json}");
    Ok(())
}
