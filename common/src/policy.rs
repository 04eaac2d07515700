//! Filtering collaborators consulted before a target is scheduled.

use std::collections::BTreeSet;

use crate::scan::{DomainScanResult, PortScanResult};

/// Well-known service ports that never answer HTTP.
pub const DEFAULT_SKIP_PORTS: &[u16] = &[
    7, 9, 13, 19, 21, 22, 23, 25, 53, 110, 111, 123, 135, 137, 138, 139, 143, 161, 389, 445,
    465, 500, 513, 514, 587, 873, 993, 995, 1080, 1433, 1521, 1723, 2049, 3306, 3389, 5432,
    5900, 6379, 11211, 27017,
];

/// Decides whether an address (IP literal or domain name) must not be probed.
pub trait Blacklist: Send + Sync {
    fn is_blacklisted(&self, addr: &str) -> bool;
}

/// Decides whether a target is still worth probing given everything already scanned.
///
/// `ip` is empty for domain targets and `domain` is empty for IP targets.
/// Implementations must be pure.
pub trait OptimizationPolicy: Send + Sync {
    fn is_eligible(
        &self,
        ip: &str,
        domain: &str,
        port: u16,
        ports: Option<&PortScanResult>,
        domains: Option<&DomainScanResult>,
    ) -> bool;
}

/// Ports excluded from fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipPorts(BTreeSet<u16>);

impl SkipPorts {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, port: u16) -> bool {
        self.0.contains(&port)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SkipPorts {
    fn default() -> Self {
        DEFAULT_SKIP_PORTS.iter().copied().collect()
    }
}

impl FromIterator<u16> for SkipPorts {
    fn from_iter<T: IntoIterator<Item = u16>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
