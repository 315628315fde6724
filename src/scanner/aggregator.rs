//! Result aggregation.
//!
//! The aggregator is the single owner of the result set while a scan runs.
//! It drains the hand-off channel, keeps open ports, reports progress and
//! verbose lines, and sorts everything once the channel closes.

use crate::output::port_line;
use crate::scanner::traits::{PortResult, PortStatus};
use indicatif::ProgressBar;
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedReceiver;

/// Finalized results of one scan.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// Open ports, sorted by port number, one entry per port.
    pub open: Vec<PortResult>,
    /// Number of probe results received.
    pub collected: usize,
    pub closed: usize,
    pub filtered: usize,
}

/// Consumes probe results as they complete.
pub struct Aggregator {
    verbose: bool,
    progress: Option<ProgressBar>,
    open: Vec<PortResult>,
    seen: HashSet<u32>,
    collected: usize,
    closed: usize,
    filtered: usize,
}

impl Aggregator {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            progress: None,
            open: Vec::new(),
            seen: HashSet::new(),
            collected: 0,
            closed: 0,
            filtered: 0,
        }
    }

    /// Tick `progress` once per received result.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Record one result.
    pub fn record(&mut self, result: PortResult) {
        self.collected += 1;

        match result.status {
            PortStatus::Open => {
                if let Some(pb) = &self.progress {
                    pb.set_message(format!("Found open port: {}", result.port));
                }
                if self.verbose {
                    self.emit(&port_line(&result));
                }
                if self.seen.insert(result.port) {
                    self.open.push(result);
                }
            }
            PortStatus::Filtered => {
                self.filtered += 1;
                if self.verbose {
                    self.emit(&port_line(&result));
                }
            }
            PortStatus::Closed => self.closed += 1,
        }

        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    /// Drain `rx` until every sender is gone, then finalize.
    pub async fn consume(mut self, mut rx: UnboundedReceiver<PortResult>) -> ResultSet {
        while let Some(result) = rx.recv().await {
            self.record(result);
        }
        self.finish()
    }

    /// Sort and hand over the result set.
    pub fn finish(mut self) -> ResultSet {
        self.open.sort_by_key(|r| r.port);

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        ResultSet {
            open: self.open,
            collected: self.collected,
            closed: self.closed,
            filtered: self.filtered,
        }
    }

    fn emit(&self, line: &str) {
        match &self.progress {
            Some(pb) => pb.suspend(|| println!("{}", line)),
            None => println!("{}", line),
        }
    }
}
