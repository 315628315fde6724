//! Service names for well-known ports.
//!
//! The table is passed to the scanner rather than read from a global, so
//! callers (and tests) can supply their own mapping.

use std::collections::HashMap;

/// Default port-to-service mapping.
const WELL_KNOWN_PORTS: &[(u16, &str)] = &[
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (110, "POP3"),
    (111, "RPC"),
    (135, "MSRPC"),
    (139, "NetBIOS"),
    (143, "IMAP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (1723, "PPTP"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5900, "VNC"),
    (8080, "HTTP-Proxy"),
];

/// Read-only lookup from port number to service name.
#[derive(Debug, Clone)]
pub struct ServiceTable {
    entries: HashMap<u16, String>,
}

impl ServiceTable {
    /// The built-in table of well-known ports.
    pub fn well_known() -> Self {
        Self::from_entries(WELL_KNOWN_PORTS.iter().copied())
    }

    /// Build a table from arbitrary `(port, name)` pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u16, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(port, name)| (port, name.into()))
                .collect(),
        }
    }

    /// Look up the service name for a port.
    ///
    /// Returns `None` if the port is not in the table.
    pub fn lookup(&self, port: u16) -> Option<&str> {
        self.entries.get(&port).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ServiceTable {
    fn default() -> Self {
        Self::well_known()
    }
}
