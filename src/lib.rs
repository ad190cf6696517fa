//! # tcpsweep - A Concurrent TCP Connect Port Scanner
//!
//! tcpsweep determines TCP reachability of ports across one or more hosts,
//! classifying every probe outcome into a fixed state taxonomy and running
//! under configurable timing policies that trade stealth for speed.
//!
//! ## Features
//!
//! - **Two-tier concurrency**: a bounded pool of targets, each scanned by
//!   its own bounded pool of port probes
//! - **State taxonomy**: open, closed, filtered, timeout, error, host and
//!   network unreachable - every probe yields exactly one state
//! - **Timing policies**: four presets (sneaky through aggressive) plus
//!   validated custom policies
//! - **Cooperative cancellation**: graceful early termination that never
//!   discards already-collected results
//! - **Flexible targeting**: IPs, hostnames, CIDR ranges, last-octet ranges
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use tcpsweep::scanner::PortScanner;
//! use tcpsweep::timing::TimingPolicy;
//! use tcpsweep::types::{Port, ScanTarget};
//!
//! #[tokio::main]
//! async fn main() {
//!     let targets = vec![ScanTarget::new("127.0.0.1", "127.0.0.1".parse().unwrap())];
//!     let ports: Vec<Port> = [22, 80, 443].iter().filter_map(|&p| Port::new(p)).collect();
//!
//!     let scanner = PortScanner::new(TimingPolicy::normal());
//!     for result in scanner.scan(&targets, &ports).await {
//!         println!("{result}");
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - validated port and target types, spec parsing
//! - [`timing`] - timing policies and presets
//! - [`cancel`] - one-shot cooperative cancellation
//! - [`scanner`] - the probe, both fan-out tiers, and the result model
//! - [`output`] - report formatting
//! - [`error`] - pre-flight error types

pub mod cancel;
pub mod cli;
pub mod error;
pub mod output;
pub mod scanner;
pub mod timing;
pub mod types;

// Re-export commonly used types
pub use cancel::Cancellation;
pub use error::ScanError;
pub use scanner::{HostPortScanner, PortScanner, PortState, ResultCollector, ScanResult, TcpProbe};
pub use timing::TimingPolicy;
pub use types::{Port, PortSpec, ScanTarget, TargetSpec};
