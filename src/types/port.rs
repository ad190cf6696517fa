//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers
//! (1-65535). `PortSpec` parses the user-facing specification syntax into a
//! sorted, deduplicated port list before any scanning begins; malformed
//! input is fatal here, never mid-scan.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
///
/// Using a newtype prevents accidental misuse of raw u16 values and rules
/// out port zero at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u16),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRange(u16, u16),
    #[error("empty port specification")]
    Empty,
}

/// A parsed port specification.
///
/// Supports formats like:
/// - Single port: "80"
/// - Comma-separated: "80,443,8080"
/// - Range: "1-1000"
/// - Mixed: "22,80,443,8000-9000"
///
/// The parsed result is always sorted and deduplicated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortSpec {
    ports: Vec<Port>,
}

impl PortSpec {
    /// Get the parsed ports as a slice, sorted ascending, no duplicates.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Consume the spec, yielding the port list.
    pub fn into_ports(self) -> Vec<Port> {
        self.ports
    }

    /// Number of unique ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let mut ports: Vec<Port> = Vec::new();

        for part in s.split(',') {
            let part = part.trim();
            if let Some((lo, hi)) = part.split_once('-') {
                let start = parse_port(lo)?;
                let end = parse_port(hi)?;
                if start > end {
                    return Err(PortError::InvalidRange(start.as_u16(), end.as_u16()));
                }
                ports.extend((start.as_u16()..=end.as_u16()).filter_map(Port::new));
            } else {
                ports.push(parse_port(part)?);
            }
        }

        ports.sort_unstable();
        ports.dedup();
        Ok(Self { ports })
    }
}

fn parse_port(s: &str) -> Result<Port, PortError> {
    let value: u16 = s
        .trim()
        .parse()
        .map_err(|_| PortError::InvalidFormat(s.trim().to_string()))?;
    Port::new(value).ok_or(PortError::OutOfRange(value))
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ports.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
