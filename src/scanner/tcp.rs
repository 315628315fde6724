//! TCP Connect Scanner implementation.
//!
//! Performs standard TCP connect scans using the operating system's
//! socket API. Completes the full handshake, so no privileges are needed.

use crate::banner::{read_banner, BANNER_TIMEOUT};
use crate::scanner::traits::{PortResult, Prober, CUSTOM_SERVICE, UNKNOWN_SERVICE};
use crate::services::ServiceTable;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::{error::Elapsed, timeout};

/// Outcome of a bounded connect attempt.
#[derive(Debug)]
pub enum ConnectOutcome<T> {
    Connected(T),
    Closed,
    Filtered,
}

/// Classify a connect attempt wrapped in `tokio::time::timeout`.
///
/// Only a timeout, either the deadline elapsing or the OS reporting one,
/// means filtered. Every other failure is closed.
pub fn classify_connect<T>(attempt: Result<io::Result<T>, Elapsed>) -> ConnectOutcome<T> {
    match attempt {
        Ok(Ok(stream)) => ConnectOutcome::Connected(stream),
        Ok(Err(e)) if e.kind() == io::ErrorKind::TimedOut => ConnectOutcome::Filtered,
        Ok(Err(_)) => ConnectOutcome::Closed,
        Err(_) => ConnectOutcome::Filtered,
    }
}

/// TCP Connect Scanner.
///
/// Each probe is bounded by `timeout` for the connect plus at most
/// [`BANNER_TIMEOUT`] for the banner read.
pub struct TcpConnectScanner {
    target: IpAddr,
    timeout: Duration,
    services: Arc<ServiceTable>,
}

impl TcpConnectScanner {
    /// Create a new TCP connect scanner.
    ///
    /// # Arguments
    /// * `target` - Target IP address to scan
    /// * `timeout` - Connection timeout per port
    /// * `services` - Well-known port names, consulted before any banner read
    pub fn new(target: IpAddr, timeout: Duration, services: Arc<ServiceTable>) -> Self {
        Self {
            target,
            timeout,
            services,
        }
    }

    pub fn target(&self) -> IpAddr {
        self.target
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The banner read deadline: short, and never longer than the connect timeout.
    fn banner_timeout(&self) -> Duration {
        BANNER_TIMEOUT.min(self.timeout)
    }

    /// Name the service behind an open port. Takes the stream by value so
    /// the connection is closed on every return path.
    async fn identify(&self, port: u16, mut stream: TcpStream) -> (String, Option<String>) {
        if let Some(name) = self.services.lookup(port) {
            return (name.to_string(), None);
        }

        match read_banner(&mut stream, self.banner_timeout()).await {
            Some(banner) => (CUSTOM_SERVICE.to_string(), Some(banner)),
            None => (UNKNOWN_SERVICE.to_string(), None),
        }
    }
}

#[async_trait]
impl Prober for TcpConnectScanner {
    async fn probe(&self, port: u32) -> PortResult {
        // Numbers past 65535 name no socket, so there is nothing to dial.
        let Ok(tcp_port) = u16::try_from(port) else {
            tracing::trace!(port, "closed, outside the TCP port range");
            return PortResult::closed(port);
        };

        let addr = SocketAddr::new(self.target, tcp_port);
        let start = Instant::now();

        match classify_connect(timeout(self.timeout, TcpStream::connect(addr)).await) {
            ConnectOutcome::Connected(stream) => {
                let response_time = start.elapsed().as_millis() as u64;
                let (service, banner) = self.identify(tcp_port, stream).await;
                tracing::trace!(port, %service, "open");

                PortResult::open(port, service)
                    .with_banner(banner)
                    .with_response_time(response_time)
            }
            ConnectOutcome::Closed => {
                tracing::trace!(port, "closed");
                PortResult::closed(port)
            }
            ConnectOutcome::Filtered => {
                tracing::trace!(port, "filtered");
                PortResult::filtered(port)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::traits::PortStatus;
    use std::net::Ipv4Addr;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn scanner(services: ServiceTable) -> TcpConnectScanner {
        TcpConnectScanner::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            Duration::from_millis(500),
            Arc::new(services),
        )
    }

    /// A port on localhost with nothing listening.
    async fn refused_port() -> u32 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port().into()
    }

    #[test]
    fn test_scanner_creation() {
        let scanner = scanner(ServiceTable::well_known());
        assert_eq!(scanner.target(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(scanner.timeout(), Duration::from_millis(500));
        assert_eq!(scanner.banner_timeout(), BANNER_TIMEOUT);
    }

    #[test]
    fn test_banner_timeout_capped_by_connect_timeout() {
        let scanner = TcpConnectScanner::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            Duration::from_millis(50),
            Arc::new(ServiceTable::well_known()),
        );
        assert_eq!(scanner.banner_timeout(), Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_classify_deadline_elapsed() {
        let attempt =
            timeout(Duration::from_millis(1), std::future::pending::<io::Result<()>>()).await;
        assert!(matches!(classify_connect(attempt), ConnectOutcome::Filtered));
    }

    #[test]
    fn test_classify_io_errors() {
        let refused: io::Result<()> = Err(io::ErrorKind::ConnectionRefused.into());
        assert!(matches!(classify_connect(Ok(refused)), ConnectOutcome::Closed));

        let unreachable: io::Result<()> = Err(io::Error::other("host unreachable"));
        assert!(matches!(classify_connect(Ok(unreachable)), ConnectOutcome::Closed));

        let timed_out: io::Result<()> = Err(io::ErrorKind::TimedOut.into());
        assert!(matches!(classify_connect(Ok(timed_out)), ConnectOutcome::Filtered));

        assert!(matches!(
            classify_connect(Ok(Ok(7u8))),
            ConnectOutcome::Connected(7)
        ));
    }

    #[tokio::test]
    async fn test_scan_refused_port() {
        let port = refused_port().await;
        let result = scanner(ServiceTable::well_known()).probe(port).await;
        assert_eq!(result.status, PortStatus::Closed);
        assert_eq!(result.service, UNKNOWN_SERVICE);
    }

    #[tokio::test]
    async fn test_known_port_skips_banner_read() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            if let Ok((mut sock, _)) = listener.accept().await {
                let _ = sock.write_all(b"hello\r\n").await;
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        });

        let result = scanner(ServiceTable::from_entries([(port, "HTTP")]))
            .probe(port.into())
            .await;
        assert_eq!(result.status, PortStatus::Open);
        assert_eq!(result.service, "HTTP");
        assert!(result.banner.is_none());
    }

    #[tokio::test]
    async fn test_unknown_port_with_banner() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            if let Ok((mut sock, _)) = listener.accept().await {
                let _ = sock.write_all(b"SSH-2.0-Test\r\n").await;
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        });

        let result = scanner(ServiceTable::from_entries(Vec::<(u16, String)>::new()))
            .probe(port.into())
            .await;
        assert_eq!(result.status, PortStatus::Open);
        assert_eq!(result.service, CUSTOM_SERVICE);
        assert_eq!(result.banner.as_deref(), Some("SSH-2.0-Test"));
    }

    #[tokio::test]
    async fn test_unknown_port_silent_service() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let start = Instant::now();
        let result = scanner(ServiceTable::from_entries(Vec::<(u16, String)>::new()))
            .probe(port.into())
            .await;
        assert_eq!(result.status, PortStatus::Open);
        assert_eq!(result.service, UNKNOWN_SERVICE);
        assert!(start.elapsed() < Duration::from_millis(500) + BANNER_TIMEOUT + Duration::from_millis(200));
        drop(listener);
    }

    #[tokio::test]
    async fn test_port_beyond_tcp_range_is_closed() {
        // Points at an unroutable address: a dial attempt would come back filtered.
        let scanner = TcpConnectScanner::new(
            "10.255.255.1".parse().unwrap(),
            Duration::from_secs(5),
            Arc::new(ServiceTable::well_known()),
        );

        let start = Instant::now();
        for port in [65536, 70000, u32::MAX] {
            let result = scanner.probe(port).await;
            assert_eq!(result.port, port);
            assert_eq!(result.status, PortStatus::Closed);
            assert_eq!(result.service, UNKNOWN_SERVICE);
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    /// Needs a route that silently drops SYNs to 10.255.255.1.
    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_blackholed_address_filtered() {
        let scanner = TcpConnectScanner::new(
            "10.255.255.1".parse().unwrap(),
            Duration::from_millis(200),
            Arc::new(ServiceTable::well_known()),
        );

        let start = Instant::now();
        let result = scanner.probe(80).await;
        assert_eq!(result.status, PortStatus::Filtered);
        assert_eq!(result.service, UNKNOWN_SERVICE);
        assert!(result.banner.is_none());
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
