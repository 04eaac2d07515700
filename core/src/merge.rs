//! Folding probe findings back into the scan results.
//!
//! Workers never touch the result sets. They send a [`Finding`] down a channel and
//! a single [`ResultMerger`], which holds the only mutable borrow of both
//! aggregates, applies them one at a time.

use tokio::sync::mpsc;
use tracing::debug;

use fphub_common::fingerprint::ProbeResult;
use fphub_common::network::target::{ProbeTarget, TargetKind};
use fphub_common::scan::{Attribute, DomainScanResult, PortScanResult};

/// Tag of every attribute the merger writes.
pub const FINGERPRINT_TAG: &str = "fingerprint";

pub type FindingTx = mpsc::UnboundedSender<Finding>;
pub type FindingRx = mpsc::UnboundedReceiver<Finding>;

pub fn channel() -> (FindingTx, FindingRx) {
    mpsc::unbounded_channel()
}

/// The names one probe identified for one target, in engine order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub target: ProbeTarget,
    pub source: String,
    pub names: Vec<String>,
}

impl Finding {
    /// Flattens every result's names. Returns `None` when nothing was identified.
    pub fn from_results(target: ProbeTarget, source: &str, results: &[ProbeResult]) -> Option<Self> {
        let names: Vec<String> = results
            .iter()
            .flat_map(|result| result.name.iter().cloned())
            .collect();
        if names.is_empty() {
            return None;
        }
        Some(Self {
            target,
            source: source.to_string(),
            names,
        })
    }
}

pub struct ResultMerger<'a> {
    ports: Option<&'a mut PortScanResult>,
    domains: Option<&'a mut DomainScanResult>,
}

impl<'a> ResultMerger<'a> {
    pub fn new(
        ports: Option<&'a mut PortScanResult>,
        domains: Option<&'a mut DomainScanResult>,
    ) -> Self {
        Self { ports, domains }
    }

    /// Appends one attribute per name and returns how many were written.
    ///
    /// There is no de-duplication: merging the same finding twice records it twice.
    pub fn merge(&mut self, finding: Finding) -> usize {
        let Finding {
            target,
            source,
            names,
        } = finding;
        let attrs = names
            .into_iter()
            .map(|name| Attribute::new(source.as_str(), FINGERPRINT_TAG, name));

        match target.kind {
            TargetKind::Ip => match self.ports.as_deref_mut() {
                Some(ports) => ports.append_port_attrs(&target.address, target.port, attrs),
                None => {
                    debug!(url = %target.url, "no port scan result to merge into");
                    0
                }
            },
            TargetKind::Domain => match self.domains.as_deref_mut() {
                Some(domains) => domains.append_domain_attrs(&target.address, attrs),
                None => {
                    debug!(url = %target.url, "no domain scan result to merge into");
                    0
                }
            },
        }
    }

    /// Applies findings until every sender is gone. Returns the number of attributes written.
    pub async fn drain(&mut self, mut rx: FindingRx) -> usize {
        let mut merged = 0;
        while let Some(finding) = rx.recv().await {
            merged += self.merge(finding);
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(names: &[&str]) -> ProbeResult {
        ProbeResult {
            name: names.iter().map(|name| name.to_string()).collect(),
            ..ProbeResult::default()
        }
    }

    #[test]
    fn finding_keeps_engine_order_across_results() {
        let finding = Finding::from_results(
            ProbeTarget::ip("10.0.0.1", 80),
            "engine",
            &[result(&["nginx", "php"]), result(&[]), result(&["wordpress"])],
        )
        .unwrap();
        assert_eq!(finding.names, ["nginx", "php", "wordpress"]);
    }

    #[test]
    fn nothing_identified_means_no_finding() {
        let target = ProbeTarget::ip("10.0.0.1", 80);
        assert!(Finding::from_results(target.clone(), "engine", &[]).is_none());
        assert!(Finding::from_results(target, "engine", &[result(&[])]).is_none());
    }

    #[test]
    fn merges_into_matching_aggregate() {
        let mut ports = PortScanResult::new();
        ports.add_port("10.0.0.1", 80);
        let mut domains = DomainScanResult::new();
        domains.add_domain("example.com");

        let mut merger = ResultMerger::new(Some(&mut ports), Some(&mut domains));
        let ip = Finding::from_results(ProbeTarget::ip("10.0.0.1", 80), "engine", &[result(&["nginx"])]);
        let domain = Finding::from_results(
            ProbeTarget::domain("example.com", 443),
            "engine",
            &[result(&["iis", "asp.net"])],
        );
        assert_eq!(merger.merge(ip.unwrap()), 1);
        assert_eq!(merger.merge(domain.unwrap()), 2);

        assert_eq!(
            ports.port_attrs("10.0.0.1", 80).unwrap(),
            [Attribute::new("engine", FINGERPRINT_TAG, "nginx")]
        );
        let contents: Vec<&str> = domains
            .domain_attrs("example.com")
            .unwrap()
            .iter()
            .map(|attr| attr.content.as_str())
            .collect();
        assert_eq!(contents, ["iis", "asp.net"]);
    }

    #[test]
    fn merging_twice_duplicates_entries() {
        let mut ports = PortScanResult::new();
        ports.add_port("10.0.0.1", 80);
        let finding =
            Finding::from_results(ProbeTarget::ip("10.0.0.1", 80), "engine", &[result(&["nginx"])])
                .unwrap();

        let mut merger = ResultMerger::new(Some(&mut ports), None);
        merger.merge(finding.clone());
        merger.merge(finding);

        assert_eq!(ports.port_attrs("10.0.0.1", 80).unwrap().len(), 2);
    }

    #[test]
    fn finding_without_aggregate_is_dropped() {
        let mut ports = PortScanResult::new();
        let finding = Finding::from_results(
            ProbeTarget::domain("example.com", 80),
            "engine",
            &[result(&["nginx"])],
        )
        .unwrap();

        let mut merger = ResultMerger::new(Some(&mut ports), None);

        assert_eq!(merger.merge(finding), 0);
        assert!(ports.ip_result.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_senders_lose_nothing() {
        const SENDERS: usize = 16;
        const NAMES: usize = 50;

        for _round in 0..20 {
            let mut ports = PortScanResult::new();
            ports.add_port("10.0.0.1", 80);
            let (tx, rx) = channel();

            let mut senders = Vec::new();
            for sender in 0..SENDERS {
                let tx = tx.clone();
                senders.push(tokio::spawn(async move {
                    for name in 0..NAMES {
                        let finding = Finding {
                            target: ProbeTarget::ip("10.0.0.1", 80),
                            source: "engine".to_string(),
                            names: vec![format!("{sender}-{name}")],
                        };
                        tx.send(finding).unwrap();
                        tokio::task::yield_now().await;
                    }
                }));
            }
            drop(tx);

            let merged = ResultMerger::new(Some(&mut ports), None).drain(rx).await;
            for sender in senders {
                sender.await.unwrap();
            }

            assert_eq!(merged, SENDERS * NAMES);
            assert_eq!(ports.port_attrs("10.0.0.1", 80).unwrap().len(), SENDERS * NAMES);
        }
    }
}
