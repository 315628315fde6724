//! Scan target resolution.
//!
//! Turns a hostname or literal address into the single IP address the
//! scanner works against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A scan target that has been resolved to an IP address.
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

    /// Resolve a hostname or literal address.
    ///
    /// Literal addresses skip DNS entirely. With `prefer_ipv4` the first IPv4
    /// answer wins; otherwise, or when no IPv4 answer exists, the first
    /// answer is used.
    pub async fn resolve(host: &str, prefer_ipv4: bool) -> Result<Self, TargetError> {
        let host = host.trim();
        if host.is_empty() {
            return Err(TargetError::EmptyHost);
        }

        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(Self::new(host, ip));
        }

        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "system resolver config unavailable, using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });

        let response = resolver
            .lookup_ip(host)
            .await
            .map_err(|e| TargetError::DnsResolutionFailed(host.to_string(), e.to_string()))?;

        let addrs: Vec<IpAddr> = response.iter().collect();
        tracing::debug!(host, answers = addrs.len(), "resolved host");

        select_address(&addrs, prefer_ipv4)
            .map(|ip| Self::new(host, ip))
            .ok_or_else(|| TargetError::NoAddressesFound(host.to_string()))
    }

    /// Check if this target is IPv4.
    pub fn is_ipv4(&self) -> bool {
        self.ip.is_ipv4()
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

/// Error type for target resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("no host given")]
    EmptyHost,
    #[error("failed to resolve host '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for host '{0}'")]
    NoAddressesFound(String),
}

/// Pick one address out of a resolver answer.
pub fn select_address(addrs: &[IpAddr], prefer_ipv4: bool) -> Option<IpAddr> {
    if prefer_ipv4 {
        if let Some(v4) = addrs.iter().find(|ip| ip.is_ipv4()) {
            return Some(*v4);
        }
    }
    addrs.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn v4(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, last))
    }

    #[test]
    fn test_select_prefers_ipv4() {
        let addrs = [IpAddr::V6(Ipv6Addr::LOCALHOST), v4(7), v4(8)];
        assert_eq!(select_address(&addrs, true), Some(v4(7)));
    }

    #[test]
    fn test_select_first_without_preference() {
        let addrs = [IpAddr::V6(Ipv6Addr::LOCALHOST), v4(7)];
        assert_eq!(
            select_address(&addrs, false),
            Some(IpAddr::V6(Ipv6Addr::LOCALHOST))
        );
    }

    #[test]
    fn test_select_falls_back_to_ipv6() {
        let addrs = [IpAddr::V6(Ipv6Addr::LOCALHOST)];
        assert_eq!(
            select_address(&addrs, true),
            Some(IpAddr::V6(Ipv6Addr::LOCALHOST))
        );
        assert_eq!(select_address(&[], true), None);
    }

    #[tokio::test]
    async fn test_resolve_literal_address() {
        let target = ScanTarget::resolve("127.0.0.1", true).await.unwrap();
        assert_eq!(target.ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(target.is_ipv4());
        assert_eq!(target.to_string(), "127.0.0.1");

        let target = ScanTarget::resolve("::1", true).await.unwrap();
        assert_eq!(target.ip, IpAddr::V6(Ipv6Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_resolve_empty_host() {
        assert!(matches!(
            ScanTarget::resolve("  ", true).await,
            Err(TargetError::EmptyHost)
        ));
    }

    #[test]
    fn test_display_with_hostname() {
        let target = ScanTarget::new("example.com", v4(1));
        assert_eq!(target.to_string(), "example.com (192.0.2.1)");
    }
}
