//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::{PortResult, PortStatus, ScanReport};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "───────────────────────────────────────────────────────────────";

/// Write the report as a human-readable table.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {} {}", style("Ports scanned:").bold(), report.ports_scanned)?;
    writeln!(
        out,
        "               {} open, {} closed, {} filtered",
        style(report.open_ports).green().bold(),
        style(report.closed_ports).red(),
        style(report.filtered_ports).yellow()
    )?;
    writeln!(out)?;

    if report.results.is_empty() {
        write_no_open_ports(out)?;
    } else {
        writeln!(out, "  {}", style(RULE).dim())?;
        writeln!(
            out,
            "  {:>6}  {:^8}  {:<15}  {}",
            style("PORT").bold(),
            style("STATE").bold(),
            style("SERVICE").bold(),
            style("BANNER").bold()
        )?;
        writeln!(out, "  {}", style(RULE).dim())?;

        for result in &report.results {
            let status_style = match result.status {
                PortStatus::Open => Style::new().green().bold(),
                PortStatus::Closed => Style::new().red(),
                PortStatus::Filtered => Style::new().yellow(),
            };

            let banner_display = result
                .banner
                .as_ref()
                .map(|b| truncate_string(b, 35))
                .unwrap_or_default();

            writeln!(
                out,
                "  {:>6}  {:^8}  {:<15}  {}",
                result.port,
                status_style.apply_to(result.status.to_string()),
                result.service,
                style(banner_display).dim()
            )?;
        }

        writeln!(out, "  {}", style(RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Scan completed in {:.2} seconds",
        report.duration_ms as f64 / 1000.0
    )?;

    Ok(())
}

/// An empty result is not a failure; tell the user what to try next.
fn write_no_open_ports<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "  {}", style("No open ports found.").yellow())?;
    writeln!(out)?;
    writeln!(out, "  Suggestions:")?;
    writeln!(out, "  - Check that the host is online and reachable")?;
    writeln!(out, "  - Increase the timeout (try --timeout 2000)")?;
    writeln!(out, "  - Scan specific well-known ports (-p 80,443,8080,22)")?;
    writeln!(out, "  - The host may be protected by a firewall")?;
    Ok(())
}

/// One-line summary of a port, used for verbose output during the scan.
pub fn port_line(result: &PortResult) -> String {
    match result.status {
        PortStatus::Open => format!("Port {}: open ({})", result.port, result.service),
        status => format!("Port {}: {}", result.port, status),
    }
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &str, ip: &str, ports: usize, concurrency: usize, timeout_ms: u64) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("Argos").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {} ({})",
        style("•").dim(),
        style(target).white().bold(),
        ip
    );
    println!(
        "{} Scanning {} ports with {} concurrent probes, {}ms timeout",
        style("•").dim(),
        style(ports).white().bold(),
        concurrency,
        timeout_ms
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum length, adding ellipsis if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::report;

    fn render(report: &ScanReport) -> String {
        let mut buf = Vec::new();
        write_plain(&mut buf, report).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }

    #[test]
    fn test_table_lists_open_ports() {
        let text = render(&report(vec![
            PortResult::open(22, "SSH"),
            PortResult::open(8000, "HTTP"),
        ]));
        assert!(text.contains("PORT"));
        assert!(text.contains("8000"));
        assert!(text.contains("HTTP"));
        assert!(text.contains("1.23 seconds"));
        assert!(!text.contains("No open ports"));
    }

    #[test]
    fn test_empty_report_gives_guidance() {
        let text = render(&report(Vec::new()));
        assert!(text.contains("No open ports found."));
        assert!(text.contains("Suggestions:"));
        assert!(!text.contains("SERVICE"));
    }

    #[test]
    fn test_port_line() {
        assert_eq!(port_line(&PortResult::open(80, "HTTP")), "Port 80: open (HTTP)");
        assert_eq!(port_line(&PortResult::filtered(81)), "Port 81: filtered");
    }
}
