//! Error types for tcpsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. These cover the
//! configuration taxonomy only: bad timing values, bad port specs, bad
//! targets. Per-probe network failures are never surfaced as errors; they
//! classify into a [`PortState`](crate::scanner::PortState) on the result.

use thiserror::Error;

/// Pre-flight error type: anything that must stop a scan before it starts.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid timing policy: {0}")]
    InvalidTiming(String),

    #[error("invalid port specification: {0}")]
    InvalidPorts(#[from] crate::types::PortError),

    #[error("invalid target: {0}")]
    InvalidTarget(#[from] crate::types::TargetError),

    #[error("no targets to scan")]
    NoTargets,
}

/// Result type alias for pre-flight operations.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PortError, TargetError};

    #[test]
    fn test_port_error_converts() {
        let error: ScanError = PortError::OutOfRange(0).into();
        assert!(matches!(error, ScanError::InvalidPorts(_)));
        assert_eq!(
            error.to_string(),
            "invalid port specification: port 0 is out of valid range (1-65535)"
        );
    }

    #[test]
    fn test_target_error_converts() {
        let error: ScanError = TargetError::InvalidFormat("???".to_string()).into();
        assert!(matches!(error, ScanError::InvalidTarget(_)));
        assert_eq!(error.to_string(), "invalid target: invalid target format: ???");
    }

    #[test]
    fn test_no_targets_display() {
        assert_eq!(ScanError::NoTargets.to_string(), "no targets to scan");
    }
}
