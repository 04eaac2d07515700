use anyhow::Context;

use fphub_common::config::Config;
use fphub_common::fingerprint::Prober;
use fphub_core::engine::ObserverWard;

use crate::terminal::{format, print};

pub async fn probe(url: &str, cfg: &Config) -> anyhow::Result<()> {
    let engine = ObserverWard::from_config(cfg).context("resolving the engine directory")?;
    let results = engine
        .probe(url)
        .await
        .with_context(|| format!("fingerprinting {url}"))?;

    if results.iter().all(|result| result.name.is_empty()) {
        print::no_results();
        return Ok(());
    }

    for (idx, result) in results.iter().enumerate() {
        let label = if result.url.is_empty() { url } else { result.url.as_str() };
        print::tree_head(idx, label);
        print::as_tree_one_level(format::probe_result_details(result));
    }
    Ok(())
}
