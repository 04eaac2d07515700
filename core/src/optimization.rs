//! Optimization-mode policies.

use fphub_common::policy::OptimizationPolicy;
use fphub_common::scan::{DomainScanResult, PortScanResult};

const WEB_DEFAULT_PORTS: [u16; 2] = [80, 443];
const RESOLUTION_TAGS: [&str; 2] = ["A", "AAAA"];

/// Treats every target as worth probing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllEligible;

impl OptimizationPolicy for AllEligible {
    fn is_eligible(
        &self,
        _ip: &str,
        _domain: &str,
        _port: u16,
        _ports: Option<&PortScanResult>,
        _domains: Option<&DomainScanResult>,
    ) -> bool {
        true
    }
}

/// Skips an IP's default web ports when a scanned domain resolves to that IP.
///
/// The domain is probed on the same ports anyway, and a probe by name reaches the
/// right virtual host where a probe by address often does not. Non-default ports
/// and domain targets are always eligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolvedHostPolicy;

impl OptimizationPolicy for ResolvedHostPolicy {
    fn is_eligible(
        &self,
        ip: &str,
        _domain: &str,
        port: u16,
        _ports: Option<&PortScanResult>,
        domains: Option<&DomainScanResult>,
    ) -> bool {
        if ip.is_empty() || !WEB_DEFAULT_PORTS.contains(&port) {
            return true;
        }
        let Some(domains) = domains else {
            return true;
        };

        !domains.domain_result.values().any(|record| {
            record
                .attrs
                .iter()
                .any(|attr| RESOLUTION_TAGS.contains(&attr.tag.as_str()) && attr.content.trim() == ip)
        })
    }
}
