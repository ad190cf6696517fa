//! Timing policies.
//!
//! A timing policy bundles the per-probe connect timeout with the sizes of
//! both concurrency pools (ports within a target, targets within a scan)
//! and the grace period granted to in-flight work during teardown. The
//! four presets trade stealth for speed; a custom policy must supply all
//! fields and is validated at construction, before any scanning begins.

use crate::error::ScanError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Immutable timing configuration for one scan invocation.
///
/// Worst-case concurrent connection count is
/// `target_pool_size * port_pool_size`; the presets keep that product in
/// check at the stealthy end and open it up at the aggressive end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingPolicy {
    name: String,
    timeout_ms: u64,
    port_pool_size: usize,
    target_pool_size: usize,
    shutdown_grace_minutes: u64,
}

impl TimingPolicy {
    /// T1 - Sneaky: long timeout, small pools. Slow and quiet.
    pub fn sneaky() -> Self {
        Self {
            name: "T1-SNEAKY".to_string(),
            timeout_ms: 3000,
            port_pool_size: 25,
            target_pool_size: 2,
            shutdown_grace_minutes: 20,
        }
    }

    /// T2 - Polite: slower than normal.
    pub fn polite() -> Self {
        Self {
            name: "T2-POLITE".to_string(),
            timeout_ms: 1500,
            port_pool_size: 50,
            target_pool_size: 5,
            shutdown_grace_minutes: 15,
        }
    }

    /// T3 - Normal: the default balance.
    pub fn normal() -> Self {
        Self {
            name: "T3-NORMAL".to_string(),
            timeout_ms: 1000,
            port_pool_size: 100,
            target_pool_size: 10,
            shutdown_grace_minutes: 10,
        }
    }

    /// T4 - Aggressive: short timeout, large pools. Fast and noisy.
    pub fn aggressive() -> Self {
        Self {
            name: "T4-AGGRESSIVE".to_string(),
            timeout_ms: 500,
            port_pool_size: 200,
            target_pool_size: 20,
            shutdown_grace_minutes: 5,
        }
    }

    /// Start building a custom policy. Fields default to the NORMAL preset.
    pub fn custom(name: impl Into<String>) -> TimingPolicyBuilder {
        TimingPolicyBuilder::new(name)
    }

    /// Policy name (e.g. "T3-NORMAL").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-probe connect timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Per-probe connect timeout in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Maximum concurrent probes against a single target.
    pub fn port_pool_size(&self) -> usize {
        self.port_pool_size
    }

    /// Maximum targets scanned concurrently.
    pub fn target_pool_size(&self) -> usize {
        self.target_pool_size
    }

    /// Grace period for in-flight work during engine teardown.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_minutes * 60)
    }
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self::normal()
    }
}

impl fmt::Display for TimingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (timeout={}ms, port-pool={}, target-pool={})",
            self.name, self.timeout_ms, self.port_pool_size, self.target_pool_size
        )
    }
}

/// Builder for custom timing policies.
///
/// `build()` validates every numeric field and fails fast on a zero value,
/// so an invalid policy can never reach the scanner.
#[derive(Debug, Clone)]
pub struct TimingPolicyBuilder {
    name: String,
    timeout_ms: u64,
    port_pool_size: usize,
    target_pool_size: usize,
    shutdown_grace_minutes: u64,
}

impl TimingPolicyBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timeout_ms: 1000,
            port_pool_size: 100,
            target_pool_size: 10,
            shutdown_grace_minutes: 10,
        }
    }

    /// Set the per-probe connect timeout in milliseconds.
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the per-target port pool size.
    pub fn port_pool_size(mut self, size: usize) -> Self {
        self.port_pool_size = size;
        self
    }

    /// Set the target pool size.
    pub fn target_pool_size(mut self, size: usize) -> Self {
        self.target_pool_size = size;
        self
    }

    /// Set the shutdown grace period in minutes.
    pub fn shutdown_grace_minutes(mut self, minutes: u64) -> Self {
        self.shutdown_grace_minutes = minutes;
        self
    }

    /// Validate and build the policy.
    pub fn build(self) -> crate::error::Result<TimingPolicy> {
        if self.timeout_ms == 0 {
            return Err(ScanError::InvalidTiming(
                "timeout must be positive".to_string(),
            ));
        }
        if self.port_pool_size == 0 || self.target_pool_size == 0 {
            return Err(ScanError::InvalidTiming(
                "pool size must be positive".to_string(),
            ));
        }
        if self.shutdown_grace_minutes == 0 {
            return Err(ScanError::InvalidTiming(
                "shutdown grace must be positive".to_string(),
            ));
        }

        Ok(TimingPolicy {
            name: self.name,
            timeout_ms: self.timeout_ms,
            port_pool_size: self.port_pool_size,
            target_pool_size: self.target_pool_size,
            shutdown_grace_minutes: self.shutdown_grace_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_construct() {
        for policy in [
            TimingPolicy::sneaky(),
            TimingPolicy::polite(),
            TimingPolicy::normal(),
            TimingPolicy::aggressive(),
        ] {
            assert!(policy.timeout_ms() > 0);
            assert!(policy.port_pool_size() > 0);
            assert!(policy.target_pool_size() > 0);
            assert!(policy.shutdown_grace() > Duration::ZERO);
        }
    }

    #[test]
    fn test_default_is_normal() {
        assert_eq!(TimingPolicy::default(), TimingPolicy::normal());
        assert_eq!(TimingPolicy::default().name(), "T3-NORMAL");
    }

    #[test]
    fn test_preset_ordering() {
        // Stealthier presets wait longer and fan out less
        assert!(TimingPolicy::sneaky().timeout() > TimingPolicy::aggressive().timeout());
        assert!(
            TimingPolicy::sneaky().port_pool_size() < TimingPolicy::aggressive().port_pool_size()
        );
    }

    #[test]
    fn test_custom_builder_defaults() {
        let policy = TimingPolicy::custom("user-custom").build().unwrap();
        assert_eq!(policy.name(), "user-custom");
        assert_eq!(policy.timeout_ms(), 1000);
        assert_eq!(policy.port_pool_size(), 100);
        assert_eq!(policy.target_pool_size(), 10);
    }

    #[test]
    fn test_custom_builder_fields() {
        let policy = TimingPolicy::custom("fast")
            .timeout_ms(250)
            .port_pool_size(500)
            .target_pool_size(50)
            .shutdown_grace_minutes(1)
            .build()
            .unwrap();
        assert_eq!(policy.timeout(), Duration::from_millis(250));
        assert_eq!(policy.port_pool_size(), 500);
        assert_eq!(policy.target_pool_size(), 50);
        assert_eq!(policy.shutdown_grace(), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_timeout_fails() {
        let result = TimingPolicy::custom("bad").timeout_ms(0).build();
        assert!(matches!(result, Err(ScanError::InvalidTiming(_))));
    }

    #[test]
    fn test_zero_pool_sizes_fail() {
        assert!(TimingPolicy::custom("bad").port_pool_size(0).build().is_err());
        assert!(TimingPolicy::custom("bad").target_pool_size(0).build().is_err());
    }

    #[test]
    fn test_zero_grace_fails() {
        assert!(TimingPolicy::custom("bad")
            .shutdown_grace_minutes(0)
            .build()
            .is_err());
    }

    #[test]
    fn test_display() {
        let text = TimingPolicy::normal().to_string();
        assert!(text.contains("T3-NORMAL"));
        assert!(text.contains("timeout=1000ms"));
    }
}
