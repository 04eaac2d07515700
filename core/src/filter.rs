//! Pruning of enumerated targets before they are scheduled.
//!
//! Checks run in a fixed order and stop at the first reason to drop:
//! blacklist, skip-port set, then (only in optimization mode) the optimization policy.

use std::collections::HashSet;

use tracing::{debug, warn};

use fphub_common::network::target::ProbeTarget;
use fphub_common::policy::{Blacklist, OptimizationPolicy, SkipPorts};
use fphub_common::scan::{DomainScanResult, PortScanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Blacklisted,
    SkippedPort,
    Redundant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub kept: usize,
    pub blacklisted: usize,
    pub skipped_port: usize,
    pub redundant: usize,
}

impl FilterStats {
    pub fn dropped(&self) -> usize {
        self.blacklisted + self.skipped_port + self.redundant
    }
}

pub struct TargetFilter<'a> {
    blacklist: &'a dyn Blacklist,
    skip_ports: &'a SkipPorts,
    optimization: Option<&'a dyn OptimizationPolicy>,
    ports: Option<&'a PortScanResult>,
    domains: Option<&'a DomainScanResult>,
}

impl<'a> TargetFilter<'a> {
    pub fn new(blacklist: &'a dyn Blacklist, skip_ports: &'a SkipPorts) -> Self {
        Self {
            blacklist,
            skip_ports,
            optimization: None,
            ports: None,
            domains: None,
        }
    }

    /// Enables optimization mode. The policy sees both full result sets.
    pub fn with_optimization(
        mut self,
        policy: &'a dyn OptimizationPolicy,
        ports: Option<&'a PortScanResult>,
        domains: Option<&'a DomainScanResult>,
    ) -> Self {
        self.optimization = Some(policy);
        self.ports = ports;
        self.domains = domains;
        self
    }

    pub fn verdict(&self, target: &ProbeTarget) -> Verdict {
        if self.blacklist.is_blacklisted(&target.address) {
            return Verdict::Blacklisted;
        }
        if self.skip_ports.contains(target.port) {
            return Verdict::SkippedPort;
        }
        if let Some(policy) = self.optimization {
            let (ip, domain) = target.ip_and_domain();
            if !policy.is_eligible(ip, domain, target.port, self.ports, self.domains) {
                return Verdict::Redundant;
            }
        }
        Verdict::Keep
    }

    /// Keeps the targets that pass every check. Each blacklisted address is warned about once.
    pub fn apply(&self, targets: Vec<ProbeTarget>) -> (Vec<ProbeTarget>, FilterStats) {
        let mut stats = FilterStats::default();
        let mut warned: HashSet<String> = HashSet::new();
        let mut kept = Vec::with_capacity(targets.len());

        for target in targets {
            match self.verdict(&target) {
                Verdict::Keep => {
                    stats.kept += 1;
                    kept.push(target);
                }
                Verdict::Blacklisted => {
                    stats.blacklisted += 1;
                    if warned.insert(target.address.clone()) {
                        warn!("{} is in blacklist, skip...", target.address);
                    }
                }
                Verdict::SkippedPort => stats.skipped_port += 1,
                Verdict::Redundant => {
                    stats.redundant += 1;
                    debug!(url = %target.url, "skipped by optimization mode");
                }
            }
        }

        (kept, stats)
    }
}
