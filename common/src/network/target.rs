//! # Probe Target Model
//!
//! A probe target is one `(address, port)` pair handed to the fingerprint engine.
//! The address is either an IP literal taken from a port scan or a domain name
//! taken from a domain scan; the two namespaces are never merged.

use std::borrow::Cow;
use std::fmt;

/// Which aggregate a target was derived from, and therefore where its findings are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Ip,
    Domain,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProbeTarget {
    pub kind: TargetKind,
    pub address: String,
    pub port: u16,
    pub url: String,
}

impl ProbeTarget {
    pub fn ip(address: &str, port: u16) -> Self {
        Self::new(TargetKind::Ip, address, port)
    }

    pub fn domain(address: &str, port: u16) -> Self {
        Self::new(TargetKind::Domain, address, port)
    }

    fn new(kind: TargetKind, address: &str, port: u16) -> Self {
        Self {
            kind,
            address: address.to_string(),
            port,
            url: format_host_url(None, address, port),
        }
    }

    /// Arguments in the order the optimization policy expects: `(ip, domain)`.
    pub fn ip_and_domain(&self) -> (&str, &str) {
        match self.kind {
            TargetKind::Ip => (&self.address, ""),
            TargetKind::Domain => ("", &self.address),
        }
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Renders a host and port as an engine target.
///
/// Without a scheme the result is `host:port` and the engine picks the scheme.
/// With a scheme, the port is omitted when it is that scheme's default.
/// IPv6 literals are bracketed.
pub fn format_host_url(scheme: Option<&str>, host: &str, port: u16) -> String {
    let host: Cow<'_, str> = if host.contains(':') && !host.starts_with('[') {
        Cow::Owned(format!("[{host}]"))
    } else {
        Cow::Borrowed(host)
    };

    match scheme {
        None => format!("{host}:{port}"),
        Some(scheme) if is_default_port(scheme, port) => format!("{scheme}://{host}"),
        Some(scheme) => format!("{scheme}://{host}:{port}"),
    }
}

fn is_default_port(scheme: &str, port: u16) -> bool {
    matches!(
        (scheme.to_ascii_lowercase().as_str(), port),
        ("http", 80) | ("https", 443)
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
