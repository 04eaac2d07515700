//! # Scan Result Model
//!
//! The aggregates produced by the port scan and domain scan stages.
//!
//! * [`PortScanResult`]: IP address → port → attribute list.
//! * [`DomainScanResult`]: domain name → attribute list.
//!
//! Attributes are append-only. Nothing in this crate removes or rewrites an
//! [`Attribute`] once it has been recorded.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Ports to probe per domain. Domains missing from the map fall back to the default web ports.
pub type DomainTargetPort = BTreeMap<String, BTreeSet<u16>>;

/// A tagged fact attached to a port or domain record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    pub source: String,
    pub tag: String,
    pub content: String,
}

impl Attribute {
    pub fn new(
        source: impl Into<String>,
        tag: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            tag: tag.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortResult {
    #[serde(default)]
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpResult {
    #[serde(default)]
    pub ports: BTreeMap<u16, PortResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortScanResult {
    pub ip_result: BTreeMap<String, IpResult>,
}

impl PortScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an open port, creating the IP entry if needed.
    pub fn add_port(&mut self, ip: &str, port: u16) {
        self.ip_result
            .entry(ip.to_string())
            .or_default()
            .ports
            .entry(port)
            .or_default();
    }

    pub fn has_port(&self, ip: &str, port: u16) -> bool {
        self.ip_result
            .get(ip)
            .is_some_and(|ip_result| ip_result.ports.contains_key(&port))
    }

    pub fn port_attrs(&self, ip: &str, port: u16) -> Option<&[Attribute]> {
        self.ip_result
            .get(ip)
            .and_then(|ip_result| ip_result.ports.get(&port))
            .map(|port_result| port_result.attrs.as_slice())
    }

    /// Appends attributes to `(ip, port)` in iteration order and returns how many were added.
    pub fn append_port_attrs<I>(&mut self, ip: &str, port: u16, attrs: I) -> usize
    where
        I: IntoIterator<Item = Attribute>,
    {
        let port_result = self
            .ip_result
            .entry(ip.to_string())
            .or_default()
            .ports
            .entry(port)
            .or_default();
        let before = port_result.attrs.len();
        port_result.attrs.extend(attrs);
        port_result.attrs.len() - before
    }

    /// Number of `(ip, port)` pairs.
    pub fn port_count(&self) -> usize {
        self.ip_result.values().map(|ip| ip.ports.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainResult {
    #[serde(default)]
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainScanResult {
    pub domain_result: BTreeMap<String, DomainResult>,
}

impl DomainScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_domain(&mut self, domain: &str) {
        self.domain_result.entry(domain.to_string()).or_default();
    }

    pub fn domain_attrs(&self, domain: &str) -> Option<&[Attribute]> {
        self.domain_result
            .get(domain)
            .map(|domain_result| domain_result.attrs.as_slice())
    }

    /// Appends attributes to `domain` in iteration order and returns how many were added.
    pub fn append_domain_attrs<I>(&mut self, domain: &str, attrs: I) -> usize
    where
        I: IntoIterator<Item = Attribute>,
    {
        let domain_result = self.domain_result.entry(domain.to_string()).or_default();
        let before = domain_result.attrs.len();
        domain_result.attrs.extend(attrs);
        domain_result.attrs.len() - before
    }
}

/// The document the command line reads and writes. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<PortScanResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<DomainScanResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_ports: Option<DomainTargetPort>,
}
