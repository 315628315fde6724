//! Command-line interface definitions for Argos.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags left
//! unset fall back to the settings file, then to built-in defaults.

use crate::config::{AppSettings, Paths};
use crate::error::{ConfigError, ScanResult};
use crate::liveness::LivenessCheck;
use crate::output::{self, OutputFormat};
use crate::scanner::{run_scan, ScanConfig};
use crate::types::{PortList, ScanTarget};
use anyhow::Context;
use clap::{ArgAction, Parser};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

/// A concurrent TCP connect port scanner.
#[derive(Parser, Debug)]
#[command(name = "argos")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent TCP connect port scanner", long_about = None)]
#[command(after_help = "EXAMPLES:\n  \
    argos -H example.com\n  \
    argos -H 192.168.1.1 -p 22,80,443 -t 50 --timeout 1000\n  \
    argos -H scanme.nmap.org -p 1-1000 -v")]
pub struct Args {
    /// Host to scan (prompted for when omitted)
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// Ports to scan, e.g. "22,80,100-200" [default: 1-1024]
    #[arg(short, long, value_name = "SPEC")]
    pub ports: Option<String>,

    /// Number of concurrent probes [default: 100]
    #[arg(short = 't', long = "threads", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Connection timeout in milliseconds [default: 500]
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Report open and filtered ports as they are found
    #[arg(short, long)]
    pub verbose: bool,

    /// Prefer IPv4 addresses when resolving the host [default: true]
    #[arg(
        short = '4',
        long = "ipv4",
        value_name = "BOOL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub prefer_ipv4: Option<bool>,

    /// Output format for results [default: plain]
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Skip the host liveness check
    #[arg(long)]
    pub no_ping: bool,

    /// Path to a settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Scan options after merging flags with settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub host: Option<String>,
    pub ports: String,
    pub concurrency: usize,
    pub timeout: Duration,
    pub verbose: bool,
    pub prefer_ipv4: bool,
    pub output: OutputFormat,
    pub check_liveness: bool,
}

impl Args {
    /// Merge these flags over `settings`.
    pub fn options(&self, settings: &AppSettings) -> anyhow::Result<Options> {
        let output = match self.output {
            Some(format) => format,
            None => settings
                .default_output_format
                .parse::<OutputFormat>()
                .map_err(anyhow::Error::msg)
                .context("invalid output format in settings")?,
        };

        let concurrency = self.concurrency.unwrap_or(settings.default_concurrency);
        if concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }

        let timeout_ms = self.timeout.unwrap_or(settings.default_timeout_ms);
        if timeout_ms == 0 {
            anyhow::bail!("timeout must be at least 1 millisecond");
        }

        Ok(Options {
            host: self.host.clone(),
            ports: self
                .ports
                .clone()
                .unwrap_or_else(|| settings.default_ports.clone()),
            concurrency,
            timeout: Duration::from_millis(timeout_ms),
            verbose: self.verbose || settings.verbose,
            prefer_ipv4: self.prefer_ipv4.unwrap_or(settings.prefer_ipv4),
            output,
            check_liveness: settings.check_liveness && !self.no_ping,
        })
    }

    fn load_settings(&self) -> anyhow::Result<AppSettings> {
        if let Some(path) = &self.config {
            return AppSettings::load_from(path)
                .with_context(|| format!("could not load settings from {}", path.display()));
        }

        match AppSettings::load() {
            Ok(settings) => Ok(settings),
            Err(ConfigError::DirectoryNotFound) => {
                tracing::debug!("no config directory, using built-in defaults");
                Ok(AppSettings::default())
            }
            Err(e) => {
                let path = Paths::new().map(|p| p.settings_file()).unwrap_or_default();
                Err(e).with_context(|| format!("could not load settings from {}", path.display()))
            }
        }
    }
}

/// Run a scan as described by `args`.
pub async fn run(args: Args) -> anyhow::Result<()> {
    let settings = args.load_settings()?;
    let options = args.options(&settings)?;
    let plain = options.output == OutputFormat::Plain;

    let host = match options.host.clone() {
        Some(host) => host,
        None => tokio::task::spawn_blocking(prompt_for_host).await??,
    };

    let ports = resolve_ports(&options.ports, &settings).context("invalid port specification")?;
    let target = resolve_target(&host, options.prefer_ipv4)
        .await
        .context("host resolution failed")?;

    if options.check_liveness {
        if plain {
            output::print_info(&format!("Checking whether {} is online...", host));
        }
        let alive = LivenessCheck::new(options.timeout * 2)
            .is_alive(target.ip)
            .await;
        if !alive {
            tracing::warn!(host = %target, "host did not answer the liveness check");
            output::print_warning(&format!(
                "{} appears to be offline or unreachable. Continuing, but results may be inaccurate.",
                target
            ));
        } else if plain {
            output::print_info(&format!("Host {} is online.", target));
        }
    }

    if plain {
        output::print_scan_header(
            &target.original,
            &target.ip.to_string(),
            ports.len(),
            options.concurrency,
            options.timeout.as_millis() as u64,
        );
    }

    let config = ScanConfig::new(target, ports)
        .with_concurrency(options.concurrency)
        .with_timeout(options.timeout)
        .with_verbose(options.verbose && plain)
        .with_progress(plain);

    let report = run_scan(config).await?;
    output::print_results(&report, options.output)?;

    Ok(())
}

/// Resolve `host`, warning when IPv4 was preferred but only IPv6 answered.
async fn resolve_target(host: &str, prefer_ipv4: bool) -> ScanResult<ScanTarget> {
    let target = ScanTarget::resolve(host, prefer_ipv4).await?;

    if prefer_ipv4 && !target.is_ipv4() {
        output::print_warning(&format!(
            "No IPv4 address found for {}, using {}",
            host, target.ip
        ));
    }

    Ok(target)
}

/// Resolve the port specification, falling back to the configured and then
/// the built-in default when it yields no ports.
fn resolve_ports(spec: &str, settings: &AppSettings) -> ScanResult<PortList> {
    let ports = PortList::resolve(spec)?;
    if !ports.is_empty() {
        return Ok(ports);
    }

    let fallback = PortList::resolve(&settings.default_ports)?;
    if !fallback.is_empty() {
        return Ok(fallback);
    }

    Ok(PortList::default_range())
}

fn prompt_for_host() -> ScanResult<String> {
    read_host(io::stdin().lock(), io::stdout())
}

fn read_host<R: BufRead, W: Write>(mut input: R, mut out: W) -> ScanResult<String> {
    write!(out, "Enter the host to scan: ")?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
