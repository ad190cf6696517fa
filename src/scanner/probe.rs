//! TCP connect probe and outcome classification.
//!
//! A probe is one timed connect against one (address, port) pair. It never
//! fails: every socket-level outcome maps to a [`PortState`] on the result,
//! and the elapsed time is recorded on success and failure alike.

use crate::scanner::{PortState, ScanResult};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Structured fault classes for failed connect attempts.
///
/// Sits between the raw socket error and the state mapping so the
/// classification contract can be tested without a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFault {
    /// Peer refused the connection (RST).
    Refused,
    /// The error itself reports a timeout (distinct from our timer firing).
    TimedOut,
    /// ICMP host unreachable / no route.
    HostUnreachable,
    /// ICMP network unreachable.
    NetworkUnreachable,
    /// ICMP port unreachable.
    PortUnreachable,
    /// Anything else.
    Other,
}

/// Derive a fault class from an I/O error.
///
/// The error kind is checked first; unrecognized kinds fall back to
/// case-insensitive substring matching on the error text ("connection
/// refused", "timed out", "network is unreachable", "no route to host",
/// "port unreachable"). The substring heuristic is pragmatic but it is the
/// documented contract: without raw-socket access the OS error message is
/// the only signal available.
pub fn fault_of(error: &io::Error) -> ProbeFault {
    match error.kind() {
        io::ErrorKind::ConnectionRefused => return ProbeFault::Refused,
        io::ErrorKind::TimedOut => return ProbeFault::TimedOut,
        _ => {}
    }

    let text = error.to_string().to_lowercase();
    if text.contains("connection refused") {
        ProbeFault::Refused
    } else if text.contains("timed out") {
        ProbeFault::TimedOut
    } else if text.contains("network is unreachable") {
        ProbeFault::NetworkUnreachable
    } else if text.contains("no route to host") || text.contains("host unreachable") {
        ProbeFault::HostUnreachable
    } else if text.contains("port unreachable") {
        ProbeFault::PortUnreachable
    } else {
        ProbeFault::Other
    }
}

/// Map a fault class to its state and reason text.
fn classify(fault: ProbeFault, error: &io::Error) -> (PortState, String) {
    match fault {
        ProbeFault::Refused => (
            PortState::Closed,
            "Connection refused (RST received)".to_string(),
        ),
        ProbeFault::TimedOut => (
            PortState::Filtered,
            "Connection timed out (likely filtered)".to_string(),
        ),
        ProbeFault::NetworkUnreachable => {
            (PortState::NetworkUnreachable, "Network unreachable".to_string())
        }
        ProbeFault::HostUnreachable => (
            PortState::HostUnreachable,
            "No route to host (ICMP unreachable)".to_string(),
        ),
        ProbeFault::PortUnreachable => (
            PortState::Filtered,
            "Port unreachable (ICMP filtered)".to_string(),
        ),
        ProbeFault::Other => (PortState::Error, format!("Connection error: {error}")),
    }
}

/// Trait seam for probes, so the orchestration tiers can be exercised with
/// a scripted probe in tests.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Probe one port. Never fails; every outcome is a classified result.
    async fn probe(&self, port: Port) -> ScanResult;

    /// The address this probe targets.
    fn target(&self) -> IpAddr;
}

/// TCP connect probe.
///
/// Uses the operating system's connect() through tokio; completes the full
/// handshake on open ports and requires no privileges.
pub struct TcpProbe {
    target: IpAddr,
    timeout: Duration,
}

impl TcpProbe {
    /// Create a probe for one target address.
    pub fn new(target: IpAddr, timeout: Duration) -> Self {
        Self { target, timeout }
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn probe(&self, port: Port) -> ScanResult {
        let addr = SocketAddr::new(self.target, port.as_u16());
        let start = Instant::now();

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                let elapsed = start.elapsed().as_millis() as u64;
                drop(stream);
                ScanResult::new(self.target, port, PortState::Open)
                    .with_response_time(elapsed)
                    .with_reason("TCP connection established")
            }
            Ok(Err(error)) => {
                let elapsed = start.elapsed().as_millis() as u64;
                let (state, reason) = classify(fault_of(&error), &error);
                ScanResult::new(self.target, port, state)
                    .with_response_time(elapsed)
                    .with_reason(reason)
            }
            Err(_) => {
                let elapsed = start.elapsed().as_millis() as u64;
                ScanResult::new(self.target, port, PortState::Timeout)
                    .with_response_time(elapsed)
                    .with_reason("Connection timeout (possibly filtered)")
            }
        }
    }

    fn target(&self) -> IpAddr {
        self.target
    }
}
