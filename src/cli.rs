//! Command-line interface definitions.

use crate::output::OutputFormat;
use crate::timing::TimingPolicy;
use clap::{Parser, ValueEnum};

/// Named timing presets selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TimingPreset {
    /// T1: long timeout, small pools. Slow and quiet.
    Sneaky,
    /// T2: slower than normal.
    Polite,
    /// T3: the default balance.
    #[default]
    Normal,
    /// T4: short timeout, large pools. Fast and noisy.
    Aggressive,
}

/// A concurrent TCP connect port scanner.
#[derive(Parser, Debug)]
#[command(name = "tcpsweep", version, about)]
pub struct Args {
    /// Target(s) to scan: IP, hostname, CIDR, or last-octet range
    ///
    /// Examples:
    ///   192.168.1.1        Single IP address
    ///   example.com        Hostname
    ///   192.168.1.0/24     CIDR range
    ///   192.168.1.10-20    Last-octet range
    #[arg(value_name = "TARGET", required = true)]
    pub targets: Vec<String>,

    /// Ports to scan (e.g. "80", "80,443", "1-1000", "22,80,8000-9000")
    #[arg(short, long, default_value = "1-1000")]
    pub ports: String,

    /// Timing preset
    #[arg(short = 'T', long = "timing", value_enum, default_value = "normal")]
    pub timing: TimingPreset,

    /// Use a custom timing policy instead of a preset
    #[arg(long, conflicts_with = "timing")]
    pub custom_timing: bool,

    /// Connect timeout in milliseconds (custom timing)
    #[arg(long, value_name = "MS", requires = "custom_timing")]
    pub timeout_ms: Option<u64>,

    /// Concurrent probes per target (custom timing)
    #[arg(long, value_name = "N", requires = "custom_timing")]
    pub port_pool: Option<usize>,

    /// Concurrently scanned targets (custom timing)
    #[arg(long, value_name = "N", requires = "custom_timing")]
    pub target_pool: Option<usize>,

    /// Teardown grace period in minutes (custom timing)
    #[arg(long, value_name = "MIN", requires = "custom_timing")]
    pub grace_minutes: Option<u64>,

    /// Show closed/filtered ports in the report
    #[arg(long)]
    pub show_closed: bool,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Build the timing policy from the flags.
    ///
    /// Custom values are validated here, before any scanning begins; an
    /// invalid policy never reaches the engine.
    pub fn timing_policy(&self) -> crate::error::Result<TimingPolicy> {
        if self.custom_timing {
            let mut builder = TimingPolicy::custom("user-custom");
            if let Some(ms) = self.timeout_ms {
                builder = builder.timeout_ms(ms);
            }
            if let Some(size) = self.port_pool {
                builder = builder.port_pool_size(size);
            }
            if let Some(size) = self.target_pool {
                builder = builder.target_pool_size(size);
            }
            if let Some(minutes) = self.grace_minutes {
                builder = builder.shutdown_grace_minutes(minutes);
            }
            return builder.build();
        }

        Ok(match self.timing {
            TimingPreset::Sneaky => TimingPolicy::sneaky(),
            TimingPreset::Polite => TimingPolicy::polite(),
            TimingPreset::Normal => TimingPolicy::normal(),
            TimingPreset::Aggressive => TimingPolicy::aggressive(),
        })
    }
}
