//! Port list resolution.
//!
//! A port specification is a comma-separated list of single ports and
//! inclusive `start-end` ranges. Resolving it yields a [`PortList`] that keeps
//! the order in which ports were written, duplicates included.
//!
//! Numbers are not bounded to the TCP port range here. A value above 65535
//! resolves like any other and is reported `closed` by the prober.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for port specification parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("invalid range format: {0}")]
    InvalidRangeFormat(String),
    #[error("invalid port number: {0}")]
    InvalidPortNumber(String),
    #[error("invalid port range: start ({0}) > end ({1})")]
    InvalidRangeOrder(u32, u32),
}

/// An ordered list of ports to probe.
///
/// Produced once per run and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortList(Vec<u32>);

impl PortList {
    /// Ports scanned when nothing else is specified.
    pub const DEFAULT_SPEC: &'static str = "1-1024";

    /// Resolve a textual port specification.
    ///
    /// An empty (or blank) specification yields an empty list; the caller
    /// decides what to fall back to.
    pub fn resolve(spec: &str) -> Result<Self, PortError> {
        let mut ports = Vec::new();

        if spec.trim().is_empty() {
            return Ok(Self(ports));
        }

        for token in spec.split(',') {
            let token = token.trim();
            if token.contains('-') {
                let bounds: Vec<&str> = token.split('-').collect();
                if bounds.len() != 2 {
                    return Err(PortError::InvalidRangeFormat(token.to_string()));
                }

                let start = parse_port(bounds[0])?;
                let end = parse_port(bounds[1])?;
                if start > end {
                    return Err(PortError::InvalidRangeOrder(start, end));
                }
                ports.extend(start..=end);
            } else {
                ports.push(parse_port(token)?);
            }
        }

        Ok(Self(ports))
    }

    /// The default `1-1024` range.
    pub fn default_range() -> Self {
        Self((1..=1024).collect())
    }

    /// Number of ports, counting duplicates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for PortList {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

impl From<Vec<u32>> for PortList {
    fn from(ports: Vec<u32>) -> Self {
        Self(ports)
    }
}

impl fmt::Display for PortList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ports", self.0.len())
    }
}

fn parse_port(s: &str) -> Result<u32, PortError> {
    let s = s.trim();
    s.parse()
        .map_err(|_| PortError::InvalidPortNumber(s.to_string()))
}
