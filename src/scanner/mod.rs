//! Scanner module - runs probes under a concurrency ceiling.
//!
//! Every port is submitted in list order. A submission first takes a
//! semaphore permit, so at most `concurrency` probes are in flight; the
//! permit travels into the probe task and is released when that task ends,
//! whatever happened inside it. Results flow through a single channel to
//! the [`Aggregator`], which owns the result set until the scan is joined.

pub mod aggregator;
pub mod tcp;
pub mod traits;

use crate::error::{ScanError, ScanResult};
use crate::services::ServiceTable;
use crate::types::{PortList, ScanTarget};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

pub use aggregator::{Aggregator, ResultSet};
pub use tcp::{classify_connect, ConnectOutcome, TcpConnectScanner};
pub use traits::{PortResult, PortStatus, Prober, CUSTOM_SERVICE, UNKNOWN_SERVICE};

/// Probes allowed in flight when nothing else is configured.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Connect timeout when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Configuration for a scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target: ScanTarget,
    pub ports: PortList,
    pub concurrency: usize,
    pub timeout: Duration,
    pub verbose: bool,
    pub show_progress: bool,
    pub services: Arc<ServiceTable>,
}

impl ScanConfig {
    /// Create a configuration with default concurrency, timeout and service table.
    pub fn new(target: ScanTarget, ports: PortList) -> Self {
        Self {
            target,
            ports,
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            verbose: false,
            show_progress: false,
            services: Arc::new(ServiceTable::well_known()),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_services(mut self, services: Arc<ServiceTable>) -> Self {
        self.services = services;
        self
    }
}

/// Complete scan report.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub target: String,
    pub ip_address: String,
    pub ports_scanned: usize,
    pub open_ports: usize,
    pub closed_ports: usize,
    pub filtered_ports: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Open ports, ascending.
    pub results: Vec<PortResult>,
}

/// Execute a complete TCP connect scan.
pub async fn run_scan(config: ScanConfig) -> ScanResult<ScanReport> {
    let started_at = Utc::now();
    let start_time = Instant::now();
    let total_ports = config.ports.len();

    tracing::debug!(
        host = %config.target,
        ports = total_ports,
        concurrency = config.concurrency,
        timeout_ms = config.timeout.as_millis() as u64,
        "starting scan"
    );

    let scanner = Arc::new(TcpConnectScanner::new(
        config.target.ip,
        config.timeout,
        Arc::clone(&config.services),
    ));

    let mut aggregator = Aggregator::new(config.verbose);
    if config.show_progress {
        aggregator = aggregator.with_progress(progress_bar(total_ports));
    }

    let set = scan_ports(scanner, config.ports.as_slice(), config.concurrency, aggregator).await?;
    let duration = start_time.elapsed();

    tracing::debug!(
        open = set.open.len(),
        elapsed_ms = duration.as_millis() as u64,
        "scan finished"
    );

    Ok(ScanReport {
        target: config.target.original,
        ip_address: config.target.ip.to_string(),
        ports_scanned: total_ports,
        open_ports: set.open.len(),
        closed_ports: set.closed,
        filtered_ports: set.filtered,
        started_at,
        duration_ms: duration.as_millis() as u64,
        results: set.open,
    })
}

/// Probe `ports` with at most `concurrency` probes in flight.
///
/// Returns only after every port has been submitted, every probe task has
/// finished, and the aggregator has drained every result.
pub async fn scan_ports<P>(
    prober: Arc<P>,
    ports: &[u32],
    concurrency: usize,
    aggregator: Aggregator,
) -> ScanResult<ResultSet>
where
    P: Prober + ?Sized + 'static,
{
    if concurrency == 0 {
        return Err(ScanError::InvalidConfig(
            "concurrency must be at least 1".to_string(),
        ));
    }
    if concurrency > Semaphore::MAX_PERMITS {
        return Err(ScanError::InvalidConfig(format!(
            "concurrency must be at most {}",
            Semaphore::MAX_PERMITS
        )));
    }

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let (tx, rx) = mpsc::unbounded_channel();
    let collector = tokio::spawn(aggregator.consume(rx));
    let mut probes = JoinSet::new();

    for &port in ports {
        // Blocks submission, never a running probe, when the pool is full.
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| ScanError::Aborted(e.to_string()))?;
        let prober = Arc::clone(&prober);
        let tx = tx.clone();

        probes.spawn(async move {
            let _permit = permit;

            let result = match AssertUnwindSafe(prober.probe(port)).catch_unwind().await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(port, "probe panicked, recording port as closed");
                    PortResult::closed(port)
                }
            };

            if tx.send(result).is_err() {
                tracing::error!(port, "result collector stopped before the scan finished");
            }
        });

        while let Some(joined) = probes.try_join_next() {
            log_join_error(joined);
        }
    }

    // Only the probe tasks hold senders now; the channel closes once they finish.
    drop(tx);

    while let Some(joined) = probes.join_next().await {
        log_join_error(joined);
    }

    collector
        .await
        .map_err(|e| ScanError::Aborted(format!("result collector failed: {}", e)))
}

fn log_join_error(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "probe task failed");
    }
}

fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    )
    .map(|s| s.progress_chars("=>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
