//! # Fingerprint Dispatch
//!
//! [`FingerprintHub::run`] is the single entry point and the single barrier:
//!
//! 1. **Enumerate** one target per `(ip, port)` and per `(domain, port)`.
//! 2. **Filter** through the blacklist, the skip-port set and, in optimization
//!    mode, the optimization policy.
//! 3. **Fan out** one probe per surviving target, never more than the worker
//!    ceiling at a time. A permit is taken *before* a worker is spawned, so the
//!    ceiling bounds spawned tasks, not just running ones.
//! 4. **Merge** every finding into the result set it came from, through the
//!    channel owned by [`ResultMerger`].
//!
//! A failed probe is logged and contributes nothing; it never stops its siblings.
//! Nothing is retried and `run` itself never fails. There is no deadline at this
//! level: a hung engine holds its slot until the engine's own timeout (if any)
//! fires, while the other slots keep draining.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use fphub_common::config::Config;
use fphub_common::fingerprint::Prober;
use fphub_common::network::target::ProbeTarget;
use fphub_common::policy::{Blacklist, OptimizationPolicy, SkipPorts};
use fphub_common::scan::{DomainScanResult, DomainTargetPort, PortScanResult};

use crate::blacklist::StaticBlacklist;
use crate::enumerate;
use crate::filter::{FilterStats, TargetFilter};
use crate::merge::{self, Finding, FindingTx, ResultMerger};
use crate::optimization::AllEligible;

/// Called after every finished probe with `(completed, total)`.
pub type ProgressCallback = dyn Fn(usize, usize) + Send + Sync;

pub struct FingerprintHub {
    prober: Arc<dyn Prober>,
    blacklist: Arc<dyn Blacklist>,
    optimization: Arc<dyn OptimizationPolicy>,
    skip_ports: SkipPorts,
    workers: usize,
    optimization_mode: bool,
    on_progress: Option<Arc<ProgressCallback>>,
}

impl FingerprintHub {
    /// Starts with an empty blacklist, the default skip-port set and a policy that
    /// keeps everything. Worker ceiling and optimization mode come from `cfg`.
    pub fn new(prober: Arc<dyn Prober>, cfg: &Config) -> Self {
        Self {
            prober,
            blacklist: Arc::new(StaticBlacklist::default()),
            optimization: Arc::new(AllEligible),
            skip_ports: SkipPorts::default(),
            workers: cfg.worker_count(),
            optimization_mode: cfg.optimization_mode,
            on_progress: None,
        }
    }

    pub fn with_blacklist(mut self, blacklist: Arc<dyn Blacklist>) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Only consulted when optimization mode is on.
    pub fn with_optimization_policy(mut self, policy: Arc<dyn OptimizationPolicy>) -> Self {
        self.optimization = policy;
        self
    }

    pub fn with_skip_ports(mut self, skip_ports: SkipPorts) -> Self {
        self.skip_ports = skip_ports;
        self
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// The targets a run would probe, after filtering.
    pub fn plan(
        &self,
        ports: Option<&PortScanResult>,
        domains: Option<&DomainScanResult>,
        domain_ports: Option<&DomainTargetPort>,
    ) -> (Vec<ProbeTarget>, FilterStats) {
        let targets = enumerate::enumerate_targets(ports, domains, domain_ports);
        let mut filter = TargetFilter::new(self.blacklist.as_ref(), &self.skip_ports);
        if self.optimization_mode {
            filter = filter.with_optimization(self.optimization.as_ref(), ports, domains);
        }
        filter.apply(targets)
    }

    /// Probes every eligible target and appends what the engine identified.
    ///
    /// Returns once every probe has finished. `domain_ports` is never modified;
    /// domains without configured ports are probed on 80 and 443.
    pub async fn run(
        &self,
        ports: Option<&mut PortScanResult>,
        domains: Option<&mut DomainScanResult>,
        domain_ports: Option<&DomainTargetPort>,
    ) {
        let (targets, filtered) = self.plan(ports.as_deref(), domains.as_deref(), domain_ports);
        let scheduled = targets.len();
        debug!(
            scheduled,
            workers = self.workers,
            "dispatching fingerprint probes"
        );

        let (tx, rx) = merge::channel();
        let mut merger = ResultMerger::new(ports, domains);
        let (failed, merged) = tokio::join!(self.fan_out(targets, tx), merger.drain(rx));

        info!(
            "Fingerprinted {scheduled} targets ({failed} failed, {merged} fingerprints), skipped {} blacklisted, {} uninteresting ports, {} redundant",
            filtered.blacklisted, filtered.skipped_port, filtered.redundant
        );
    }

    /// Runs one probe per target under the worker ceiling. Returns the number of failed probes.
    async fn fan_out(&self, targets: Vec<ProbeTarget>, tx: FindingTx) -> usize {
        let total = targets.len();
        let slots = Arc::new(Semaphore::new(self.workers));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut workers: JoinSet<bool> = JoinSet::new();

        for target in targets {
            let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
                break;
            };
            let prober = Arc::clone(&self.prober);
            let tx = tx.clone();
            let completed = Arc::clone(&completed);
            let on_progress = self.on_progress.clone();

            workers.spawn(async move {
                let _permit = permit;
                let _tick = ProgressTick {
                    completed,
                    total,
                    on_progress,
                };
                probe_target(prober.as_ref(), target, &tx).await
            });
        }
        drop(tx);

        let mut failed = 0;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(true) => {}
                Ok(false) => failed += 1,
                Err(e) => {
                    error!("fingerprint worker panicked: {e}");
                    failed += 1;
                }
            }
        }
        failed
    }
}

/// Counts a worker as finished when it is dropped, so a worker that panics still
/// advances progress.
struct ProgressTick {
    completed: Arc<AtomicUsize>,
    total: usize,
    on_progress: Option<Arc<ProgressCallback>>,
}

impl Drop for ProgressTick {
    fn drop(&mut self) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(callback) = &self.on_progress {
            callback(done, self.total);
        }
    }
}

async fn probe_target(prober: &dyn Prober, target: ProbeTarget, tx: &FindingTx) -> bool {
    match prober.probe(&target.url).await {
        Ok(results) => {
            if let Some(finding) = Finding::from_results(target, prober.source(), &results) {
                // The receiver outlives every worker; a send can only fail if it panicked.
                let _ = tx.send(finding);
            }
            true
        }
        Err(e) => {
            error!("{}: fingerprint probe failed: {e}", target.url);
            false
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
