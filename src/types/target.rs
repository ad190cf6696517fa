//! Target specification types with CIDR, range, and hostname support.
//!
//! The scanner engine consumes a resolved, ordered, deduplicated address
//! list; this module is the upstream collaborator that produces it.
//! Supported forms:
//! - Single IP addresses (IPv4 and IPv6)
//! - CIDR notation (192.168.1.0/24)
//! - Last-octet ranges (192.168.1.10-20)
//! - Hostnames (example.com)

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tracing::warn;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A single scan target that has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
    #[error("CIDR range too large: {0} addresses (max: {1})")]
    CidrTooLarge(u128, u128),
    #[error("invalid address range: {0}")]
    InvalidRange(String),
}

/// A target specification that may expand to multiple addresses.
#[derive(Debug, Clone)]
pub enum TargetSpec {
    /// A single IP address.
    Single(IpAddr),
    /// A CIDR network range.
    Cidr(IpNetwork),
    /// An inclusive last-octet range, e.g. 192.168.1.10-20.
    Range(Ipv4Addr, u8),
    /// A hostname to be resolved.
    Hostname(String),
}

impl TargetSpec {
    /// Maximum number of hosts allowed in a CIDR range.
    pub const MAX_CIDR_HOSTS: u128 = 65536; // /16 for IPv4

    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        if s.contains('/') {
            let network: IpNetwork = s
                .parse()
                .map_err(|_| TargetError::InvalidCidr(s.to_string()))?;

            let host_count = match network {
                IpNetwork::V4(net) => net.size() as u128,
                IpNetwork::V6(net) => {
                    let prefix = net.prefix() as u32;
                    if prefix >= 128 {
                        1
                    } else {
                        1u128 << (128 - prefix)
                    }
                }
            };
            if host_count > Self::MAX_CIDR_HOSTS {
                return Err(TargetError::CidrTooLarge(host_count, Self::MAX_CIDR_HOSTS));
            }

            return Ok(Self::Cidr(network));
        }

        // Dash range over the last octet: "192.168.1.10-20"
        if let Some((base, end)) = s.rsplit_once('-') {
            if let Ok(start) = base.parse::<Ipv4Addr>() {
                let end: u8 = end
                    .trim()
                    .parse()
                    .map_err(|_| TargetError::InvalidRange(s.to_string()))?;
                if end < start.octets()[3] {
                    return Err(TargetError::InvalidRange(s.to_string()));
                }
                return Ok(Self::Range(start, end));
            }
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Resolve this specification to a list of scan targets.
    ///
    /// CIDR and dash ranges expand to all host addresses; hostnames go
    /// through DNS and resolve to their first address.
    pub async fn resolve(&self) -> Result<Vec<ScanTarget>, TargetError> {
        match self {
            Self::Single(ip) => Ok(vec![ScanTarget::new(ip.to_string(), *ip)]),

            Self::Cidr(network) => {
                let original = network.to_string();
                let targets: Vec<ScanTarget> = network
                    .iter()
                    .filter(|ip| {
                        // Skip network and broadcast addresses for IPv4
                        if let (IpNetwork::V4(net), IpAddr::V4(addr)) = (network, ip) {
                            if net.prefix() < 31 {
                                return *addr != net.network() && *addr != net.broadcast();
                            }
                        }
                        true
                    })
                    .map(|ip| ScanTarget::new(original.clone(), ip))
                    .collect();
                Ok(targets)
            }

            Self::Range(start, end) => {
                let [a, b, c, first] = start.octets();
                let original = format!("{start}-{end}");
                Ok((first..=*end)
                    .map(|d| {
                        ScanTarget::new(original.clone(), IpAddr::V4(Ipv4Addr::new(a, b, c, d)))
                    })
                    .collect())
            }

            Self::Hostname(hostname) => {
                let resolver =
                    TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

                let response = resolver.lookup_ip(hostname.as_str()).await.map_err(|e| {
                    TargetError::DnsResolutionFailed(hostname.clone(), e.to_string())
                })?;

                match response.iter().next() {
                    Some(ip) => Ok(vec![ScanTarget::new(hostname.clone(), ip)]),
                    None => Err(TargetError::NoAddressesFound(hostname.clone())),
                }
            }
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Cidr(network) => write!(f, "{}", network),
            Self::Range(start, end) => write!(f, "{}-{}", start, end),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// Expand raw target strings into an ordered, deduplicated address list.
///
/// Malformed specs are fatal; names that fail DNS resolution only log a
/// warning and are skipped, so one dead hostname never sinks the batch.
pub async fn expand_targets(raw: &[String]) -> Result<Vec<ScanTarget>, TargetError> {
    let mut seen: HashSet<IpAddr> = HashSet::new();
    let mut targets = Vec::new();

    for input in raw {
        let spec = TargetSpec::parse(input)?;
        match spec.resolve().await {
            Ok(resolved) => {
                for target in resolved {
                    if seen.insert(target.ip) {
                        targets.push(target);
                    }
                }
            }
            Err(e @ (TargetError::DnsResolutionFailed(..) | TargetError::NoAddressesFound(_))) => {
                warn!(host = %input, error = %e, "skipping unresolvable target");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(targets)
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if !label.chars().next().is_some_and(|c| c.is_alphanumeric()) {
            return false;
        }
        if !label.chars().last().is_some_and(|c| c.is_alphanumeric()) {
            return false;
        }
        if !label.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4() {
        let spec = TargetSpec::parse("192.168.1.1").unwrap();
        assert!(matches!(spec, TargetSpec::Single(IpAddr::V4(_))));
    }

    #[test]
    fn test_parse_ipv6() {
        let spec = TargetSpec::parse("::1").unwrap();
        assert!(matches!(spec, TargetSpec::Single(IpAddr::V6(_))));
    }

    #[test]
    fn test_parse_cidr_v4() {
        let spec = TargetSpec::parse("192.168.1.0/24").unwrap();
        if let TargetSpec::Cidr(network) = spec {
            assert_eq!(network.prefix(), 24);
        } else {
            panic!("Expected CIDR");
        }
    }

    #[test]
    fn test_cidr_too_large() {
        // /8 would be 16M hosts
        let result = TargetSpec::parse("10.0.0.0/8");
        assert!(matches!(result, Err(TargetError::CidrTooLarge(_, _))));
    }

    #[test]
    fn test_parse_octet_range() {
        let spec = TargetSpec::parse("10.0.0.5-8").unwrap();
        assert!(matches!(spec, TargetSpec::Range(_, 8)));
    }

    #[test]
    fn test_backwards_range_rejected() {
        let result = TargetSpec::parse("10.0.0.20-5");
        assert!(matches!(result, Err(TargetError::InvalidRange(_))));
    }

    #[test]
    fn test_parse_hostname() {
        let spec = TargetSpec::parse("example.com").unwrap();
        assert!(matches!(spec, TargetSpec::Hostname(_)));
    }

    #[tokio::test]
    async fn test_resolve_range() {
        let spec = TargetSpec::parse("10.0.0.5-8").unwrap();
        let targets = spec.resolve().await.unwrap();
        let ips: Vec<String> = targets.iter().map(|t| t.ip.to_string()).collect();
        assert_eq!(ips, vec!["10.0.0.5", "10.0.0.6", "10.0.0.7", "10.0.0.8"]);
    }

    #[tokio::test]
    async fn test_expand_dedups_preserving_order() {
        let raw = vec![
            "127.0.0.2".to_string(),
            "127.0.0.1".to_string(),
            "127.0.0.2".to_string(),
        ];
        let targets = expand_targets(&raw).await.unwrap();
        let ips: Vec<String> = targets.iter().map(|t| t.ip.to_string()).collect();
        assert_eq!(ips, vec!["127.0.0.2", "127.0.0.1"]);
    }

    #[test]
    fn test_valid_hostname() {
        assert!(is_valid_hostname("example.com"));
        assert!(is_valid_hostname("sub.example.com"));
        assert!(is_valid_hostname("my-server"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-invalid.com"));
    }
}
