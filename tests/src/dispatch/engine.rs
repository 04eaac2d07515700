#![cfg(all(test, unix))]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use fphub_common::config::Config;
use fphub_common::scan::{Attribute, DomainScanResult, PortScanResult};
use fphub_core::dispatch::FingerprintHub;
use fphub_core::engine::{ENGINE_SOURCE, ObserverWard};
use fphub_core::merge::FINGERPRINT_TAG;

/// Stands in for the engine: fails for port 8081, reports nothing for 8082 and
/// reports the port's "product" otherwise. Needs its data file next to it.
const STUB_ENGINE: &str = r#"#!/bin/sh
[ -f web_fingerprint_v3.json ] || { echo "missing fingerprint database" >&2; exit 4; }
case "$2" in
  *:8081) echo "connection reset" >&2; exit 1 ;;
  *:8082) exit 0 ;;
  *) port="${2##*:}"; printf '[{"url":"%s","name":["product-%s"],"status_code":200}]' "$2" "$port" > "$4" ;;
esac
"#;

fn install_stub(dir: &Path) -> anyhow::Result<()> {
    let script = dir.join("stub_engine");
    std::fs::write(&script, STUB_ENGINE)?;
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
    std::fs::write(dir.join("web_fingerprint_v3.json"), "[]")?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subprocess_engine_failures_stay_isolated() -> anyhow::Result<()> {
    let engine_dir = tempfile::tempdir()?;
    let scratch_dir = tempfile::tempdir()?;
    install_stub(engine_dir.path())?;

    let cfg = Config {
        engine_dir: engine_dir.path().to_path_buf(),
        engine_bin: Some("stub_engine".into()),
        scratch_dir: Some(scratch_dir.path().to_path_buf()),
        ..Config::default()
    };
    let engine = ObserverWard::from_config(&cfg)?;

    let mut ports = PortScanResult::new();
    for port in [8080, 8081, 8082] {
        ports.add_port("127.0.0.1", port);
    }
    let mut domains = DomainScanResult::new();
    domains.add_domain("example.com");

    FingerprintHub::new(Arc::new(engine), &cfg)
        .run(Some(&mut ports), Some(&mut domains), None)
        .await;

    assert_eq!(
        ports.port_attrs("127.0.0.1", 8080).unwrap(),
        [Attribute::new(ENGINE_SOURCE, FINGERPRINT_TAG, "product-8080")]
    );
    assert!(ports.port_attrs("127.0.0.1", 8081).unwrap().is_empty());
    assert!(ports.port_attrs("127.0.0.1", 8082).unwrap().is_empty());

    let mut names: Vec<&str> = domains
        .domain_attrs("example.com")
        .unwrap()
        .iter()
        .map(|attr| attr.content.as_str())
        .collect();
    names.sort();
    assert_eq!(names, ["product-443", "product-80"]);

    assert_eq!(std::fs::read_dir(scratch_dir.path())?.count(), 0);
    Ok(())
}
