//! Banner grabbing on freshly opened TCP connections.
//!
//! Many services announce themselves as soon as a client connects. A single
//! short read is enough to tell whether something is talking; the text is
//! kept for display only and never parsed.

use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

/// Maximum bytes to read for a banner.
pub const MAX_BANNER_SIZE: usize = 1024;

/// Upper bound on the banner read.
pub const BANNER_TIMEOUT: Duration = Duration::from_millis(200);

/// Longest banner kept for display.
const MAX_DISPLAY_LEN: usize = 256;

/// Read whatever the peer sends unprompted, waiting at most `wait`.
///
/// Returns `None` on timeout, error, or EOF without data.
pub async fn read_banner<S>(stream: &mut S, wait: Duration) -> Option<String>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; MAX_BANNER_SIZE];

    match timeout(wait, stream.read(&mut buffer)).await {
        Ok(Ok(n)) if n > 0 => Some(sanitize_banner(&buffer[..n])),
        _ => None,
    }
}

/// Sanitize banner by removing non-printable characters and limiting length.
fn sanitize_banner(data: &[u8]) -> String {
    let s: String = data
        .iter()
        .take(MAX_DISPLAY_LEN)
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else if b == b'\r' || b == b'\n' || b == b'\t' {
                ' '
            } else {
                '.'
            }
        })
        .collect();

    // Collapse runs of spaces
    let mut result = String::with_capacity(s.len());
    let mut prev_space = false;
    for c in s.chars() {
        if c == ' ' {
            if !prev_space {
                result.push(c);
            }
            prev_space = true;
        } else {
            result.push(c);
            prev_space = false;
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn test_sanitize_banner() {
        let data = b"SSH-2.0-OpenSSH_8.9\r\n";
        assert_eq!(sanitize_banner(data), "SSH-2.0-OpenSSH_8.9");
    }

    #[test]
    fn test_sanitize_binary_data() {
        let data = b"\x00\x01Hello\x02World\x03";
        assert_eq!(sanitize_banner(data), "..Hello.World.");
    }

    #[test]
    fn test_sanitize_truncates() {
        let data = vec![b'a'; 2000];
        assert_eq!(sanitize_banner(&data).len(), MAX_DISPLAY_LEN);
    }

    #[tokio::test]
    async fn test_read_banner_with_data() {
        let (mut client, mut server) = tokio::io::duplex(64);
        server.write_all(b"220 ready\r\n").await.unwrap();
        let banner = read_banner(&mut client, Duration::from_millis(200)).await;
        assert_eq!(banner.as_deref(), Some("220 ready"));
    }

    #[tokio::test]
    async fn test_read_banner_silent_peer() {
        let (mut client, _server) = tokio::io::duplex(64);
        let banner = read_banner(&mut client, Duration::from_millis(20)).await;
        assert!(banner.is_none());
    }

    #[tokio::test]
    async fn test_read_banner_closed_peer() {
        let (mut client, server) = tokio::io::duplex(64);
        drop(server);
        assert!(read_banner(&mut client, Duration::from_millis(200)).await.is_none());
    }
}
