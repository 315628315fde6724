//! # Argos - A Concurrent TCP Port Scanner
//!
//! Argos probes a set of TCP ports on one host with a bounded number of
//! connections in flight, classifies every port as open, closed, or
//! filtered, and reports the open ones ordered by port number.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use argos::scanner::{run_scan, ScanConfig};
//! use argos::types::{PortList, ScanTarget};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let target = ScanTarget::resolve("scanme.nmap.org", true).await.unwrap();
//!     let ports: PortList = "22,80,100-200".parse().unwrap();
//!
//!     let config = ScanConfig::new(target, ports)
//!         .with_concurrency(100)
//!         .with_timeout(Duration::from_millis(500));
//!
//!     let report = run_scan(config).await.unwrap();
//!     for result in &report.results {
//!         println!("{} {} {}", result.port, result.status, result.service);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port list resolution and target resolution
//! - [`scanner`] - The probe, the bounded scheduler, and the aggregator
//! - [`services`] - Well-known port names
//! - [`liveness`] - Host reachability pre-check
//! - [`config`] - Persisted defaults
//! - [`output`] - Report rendering
//! - [`error`] - Error types

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod liveness;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::{ConfigError, ScanError};
pub use scanner::{PortResult, PortStatus, Prober, ScanReport};
pub use services::ServiceTable;
pub use types::{PortError, PortList, ScanTarget, TargetError};
