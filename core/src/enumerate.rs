//! Derives probe targets from the two scan result shapes.

use fphub_common::network::target::ProbeTarget;
use fphub_common::scan::{DomainScanResult, DomainTargetPort, PortScanResult};

/// Probed for every domain that has no explicit port configuration.
pub const DEFAULT_DOMAIN_PORTS: [u16; 2] = [80, 443];

/// Every `(address, port)` pair worth considering, IP targets first.
///
/// `domain_ports` is only read. Domains without an entry, or with an empty one,
/// get [`DEFAULT_DOMAIN_PORTS`] without the map being touched.
pub fn enumerate_targets(
    ports: Option<&PortScanResult>,
    domains: Option<&DomainScanResult>,
    domain_ports: Option<&DomainTargetPort>,
) -> Vec<ProbeTarget> {
    let mut targets = Vec::new();
    if let Some(ports) = ports {
        targets.extend(ip_targets(ports));
    }
    if let Some(domains) = domains {
        targets.extend(domain_targets(domains, domain_ports));
    }
    targets
}

pub fn ip_targets(ports: &PortScanResult) -> impl Iterator<Item = ProbeTarget> + '_ {
    ports.ip_result.iter().flat_map(|(ip, ip_result)| {
        ip_result
            .ports
            .keys()
            .map(move |&port| ProbeTarget::ip(ip, port))
    })
}

pub fn domain_targets<'a>(
    domains: &'a DomainScanResult,
    domain_ports: Option<&'a DomainTargetPort>,
) -> impl Iterator<Item = ProbeTarget> + 'a {
    domains.domain_result.keys().flat_map(move |domain| {
        ports_for_domain(domain, domain_ports)
            .into_iter()
            .map(move |port| ProbeTarget::domain(domain, port))
    })
}

/// Configured ports for `domain`, or the default web ports.
pub fn ports_for_domain(domain: &str, domain_ports: Option<&DomainTargetPort>) -> Vec<u16> {
    match domain_ports.and_then(|map| map.get(domain)) {
        Some(configured) if !configured.is_empty() => configured.iter().copied().collect(),
        _ => DEFAULT_DOMAIN_PORTS.to_vec(),
    }
}
