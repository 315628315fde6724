//! Probe abstraction.
//!
//! Defines the per-port result type and the [`Prober`] trait the scheduler
//! drives, so the scheduling logic can be exercised without a network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service label for open ports with no table entry and no banner.
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Service label for open ports that sent a banner.
pub const CUSTOM_SERVICE: &str = "custom-service";

/// Status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// Connection accepted.
    Open,
    /// Connection actively refused, or failed for a reason other than a timeout.
    Closed,
    /// Connection attempt timed out, likely dropped by a firewall.
    Filtered,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
        }
    }
}

/// Result of probing a single port.
///
/// Created once by a probe and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortResult {
    /// The port number that was probed, as written in the port list.
    pub port: u32,
    /// Status determined by the probe.
    pub status: PortStatus,
    /// Detected or inferred service name.
    pub service: String,
    /// Banner captured from the service (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// Connect latency in milliseconds, for open ports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl PortResult {
    /// An open port running `service`.
    pub fn open(port: u32, service: impl Into<String>) -> Self {
        Self {
            port,
            status: PortStatus::Open,
            service: service.into(),
            banner: None,
            response_time_ms: None,
        }
    }

    pub fn closed(port: u32) -> Self {
        Self::unanswered(port, PortStatus::Closed)
    }

    pub fn filtered(port: u32) -> Self {
        Self::unanswered(port, PortStatus::Filtered)
    }

    fn unanswered(port: u32, status: PortStatus) -> Self {
        Self {
            port,
            status,
            service: UNKNOWN_SERVICE.to_string(),
            banner: None,
            response_time_ms: None,
        }
    }

    /// Set the banner.
    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    /// Set the response time.
    pub fn with_response_time(mut self, time_ms: u64) -> Self {
        self.response_time_ms = Some(time_ms);
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

/// Something that can classify a single port.
///
/// Implementations must always return a result: failures degrade to
/// `Closed` rather than surfacing as errors.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe one port.
    async fn probe(&self, port: u32) -> PortResult;
}
