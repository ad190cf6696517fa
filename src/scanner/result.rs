//! Probe outcomes: the port state taxonomy and the immutable scan result.

use crate::types::Port;
use serde::Serialize;
use std::fmt;
use std::net::IpAddr;

/// State of a probed port.
///
/// Every probe attempt classifies into exactly one of these; a probe never
/// fails without producing a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortState {
    /// Service accepted the connection.
    Open,
    /// Connection actively refused (RST received).
    Closed,
    /// Filtered by a firewall or ICMP-level rejection.
    Filtered,
    /// No response within the timeout.
    Timeout,
    /// Probe failed for an unclassified reason.
    Error,
    /// No route to the host.
    HostUnreachable,
    /// Network unreachable.
    NetworkUnreachable,
}

impl PortState {
    /// Human-readable description of the state.
    pub fn description(self) -> &'static str {
        match self {
            Self::Open => "Port is open",
            Self::Closed => "Port is closed",
            Self::Filtered => "Filtered by firewall",
            Self::Timeout => "No response within timeout",
            Self::Error => "Error during probe",
            Self::HostUnreachable => "Host unreachable",
            Self::NetworkUnreachable => "Network unreachable",
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Screaming case so states stand out in report lines
        let name = match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Filtered => "FILTERED",
            Self::Timeout => "TIMEOUT",
            Self::Error => "ERROR",
            Self::HostUnreachable => "HOST_UNREACHABLE",
            Self::NetworkUnreachable => "NETWORK_UNREACHABLE",
        };
        write!(f, "{}", name)
    }
}

/// Result of one probe against one (address, port) pair.
///
/// Built once by the probe, immutable afterwards. The state is required at
/// construction; there is no resultless probe and no stateless result.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// Display label for the host (the address text).
    pub host: String,
    /// Probed address.
    pub address: IpAddr,
    /// Probed port.
    pub port: Port,
    /// Classified outcome.
    pub state: PortState,
    /// Elapsed time of the attempt, recorded on every path.
    pub response_time_ms: u64,
    /// Why the probe classified the way it did.
    pub reason: String,
}

impl ScanResult {
    /// Create a result. Address, port, and state are required up front.
    pub fn new(address: IpAddr, port: Port, state: PortState) -> Self {
        Self {
            host: address.to_string(),
            address,
            port,
            state,
            response_time_ms: 0,
            reason: String::new(),
        }
    }

    /// Set the measured response time.
    pub fn with_response_time(mut self, elapsed_ms: u64) -> Self {
        self.response_time_ms = elapsed_ms;
        self
    }

    /// Set the classification reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Check if the port accepted a connection.
    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {} ({}ms)",
            self.host, self.port, self.state, self.response_time_ms
        )?;
        if !self.reason.is_empty() {
            write!(f, " [{}]", self.reason)?;
        }
        Ok(())
    }
}
