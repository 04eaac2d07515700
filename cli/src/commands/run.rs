use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{info, warn};

use fphub_common::config::Config;
use fphub_common::scan::ScanInput;
use fphub_core::blacklist::StaticBlacklist;
use fphub_core::dispatch::FingerprintHub;
use fphub_core::engine::ObserverWard;
use fphub_core::optimization::ResolvedHostPolicy;

use crate::commands::RunArgs;
use crate::terminal::{colors, format, print, spinner};

pub async fn run(args: RunArgs, base: &Config) -> anyhow::Result<()> {
    let cfg: Config = args.apply(base);

    let raw = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("reading {}", args.input.display()))?;
    let mut input: ScanInput = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let blacklist = match &args.blacklist {
        Some(path) => StaticBlacklist::load(path)
            .with_context(|| format!("loading blacklist {}", path.display()))?,
        None => StaticBlacklist::default(),
    };

    let engine = ObserverWard::from_config(&cfg)
        .context("resolving the engine directory")?
        .with_logged_stdout();
    if !engine.binary().is_file() {
        warn!(
            "Engine binary {} not found, every probe will fail",
            engine.binary().display()
        );
    }

    let hub = FingerprintHub::new(Arc::new(engine), &cfg)
        .with_blacklist(Arc::new(blacklist))
        .with_optimization_policy(Arc::new(ResolvedHostPolicy))
        .on_progress(spinner::report_progress);

    let (planned, _) = hub.plan(
        input.ports.as_ref(),
        input.domains.as_ref(),
        input.domain_ports.as_ref(),
    );
    info!(
        "{} targets queued on {} workers ({} profile)",
        planned.len(),
        hub.worker_count(),
        cfg.performance
    );

    let start_time: Instant = Instant::now();
    spinner::start(planned.len());
    hub.run(
        input.ports.as_mut(),
        input.domains.as_mut(),
        input.domain_ports.as_ref(),
    )
    .await;
    spinner::finish();

    let found = print_results(&input);
    print_summary(found, start_time.elapsed());

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&input)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Updated scan result written to {}", path.display());
    }
    Ok(())
}

fn print_results(input: &ScanInput) -> usize {
    let rows = format::fingerprinted(input);
    if rows.is_empty() {
        print::no_results();
        return 0;
    }

    print::header("fingerprints");
    for (idx, row) in rows.iter().enumerate() {
        print::tree_head(idx, &row.label);
        print::as_tree_one_level(format::fingerprint_details(row));
    }
    rows.len()
}

fn print_summary(found: usize, total_time: Duration) {
    let found: ColoredString = format!("{found} targets").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: &ColoredString = &format!("Dispatch Complete: {found} fingerprinted in {total_time}")
        .color(colors::TEXT_DEFAULT);

    print::fat_separator();
    print::centerln(&output.to_string());
}
