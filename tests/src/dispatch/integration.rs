#![cfg(test)]
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use fphub_common::config::{Config, PerformanceMode};
use fphub_common::fingerprint::Prober;
use fphub_common::scan::{Attribute, DomainScanResult, DomainTargetPort, PortScanResult, ScanInput};
use fphub_core::blacklist::StaticBlacklist;
use fphub_core::dispatch::FingerprintHub;
use fphub_core::merge::FINGERPRINT_TAG;

use crate::utils::{FAKE_SOURCE, FakeProber};

fn hub(prober: &Arc<FakeProber>, cfg: &Config) -> FingerprintHub {
    FingerprintHub::new(Arc::clone(prober) as Arc<dyn Prober>, cfg)
}

/// One open web port on one IP ends up with exactly the engine's finding.
#[tokio::test]
async fn single_ip_end_to_end() {
    let prober = Arc::new(FakeProber::default().with_answer("10.0.0.1:80", &["nginx"]));
    let mut ports = PortScanResult::new();
    ports.add_port("10.0.0.1", 80);

    hub(&prober, &Config::default())
        .run(Some(&mut ports), None, None)
        .await;

    assert_eq!(prober.call_count(), 1);
    assert_eq!(
        ports.port_attrs("10.0.0.1", 80).unwrap(),
        [Attribute::new(FAKE_SOURCE, FINGERPRINT_TAG, "nginx")]
    );
}

#[tokio::test]
async fn scan_document_round_trips_through_dispatch() -> anyhow::Result<()> {
    let raw = r#"{
        "ports": {
            "10.0.0.1": { "ports": {
                "80": { "attrs": [ { "source": "portscan", "tag": "banner", "content": "HTTP/1.1 200" } ] },
                "22": {}
            } },
            "10.0.0.66": { "ports": { "8080": {} } }
        },
        "domains": { "example.com": {}, "api.example.com": {} },
        "domain_ports": { "api.example.com": [8443] }
    }"#;
    let mut input: ScanInput = serde_json::from_str(raw)?;

    let prober = Arc::new(
        FakeProber::default()
            .with_answer("10.0.0.1:80", &["nginx", "php"])
            .with_answer("example.com:443", &["cloudflare"])
            .with_answer("api.example.com:8443", &["spring-boot"]),
    );
    hub(&prober, &Config::default())
        .with_blacklist(Arc::new(StaticBlacklist::parse("10.0.0.64/26")?))
        .run(
            input.ports.as_mut(),
            input.domains.as_mut(),
            input.domain_ports.as_ref(),
        )
        .await;

    // 10.0.0.66 is blacklisted, port 22 is skipped, example.com gets 80 and 443.
    assert_eq!(prober.call_count(), 4);

    let json: serde_json::Value = serde_json::to_value(&input)?;
    let attrs = &json["ports"]["10.0.0.1"]["ports"]["80"]["attrs"];
    assert_eq!(attrs.as_array().map(Vec::len), Some(3));
    assert_eq!(attrs[0]["content"], "HTTP/1.1 200");
    assert_eq!(attrs[1]["content"], "nginx");
    assert_eq!(attrs[2]["content"], "php");
    assert_eq!(json["domains"]["example.com"]["attrs"][0]["content"], "cloudflare");
    assert_eq!(json["domains"]["api.example.com"]["attrs"][0]["content"], "spring-boot");
    assert_eq!(json["domain_ports"], serde_json::json!({ "api.example.com": [8443] }));
    Ok(())
}

#[tokio::test]
async fn blacklisted_ip_keeps_its_attributes_untouched() -> anyhow::Result<()> {
    let prober = Arc::new(FakeProber::default().with_default(&["nginx"]));
    let mut ports = PortScanResult::new();
    ports.add_port("10.0.0.1", 80);
    ports.add_port("10.0.0.2", 80);

    hub(&prober, &Config::default())
        .with_blacklist(Arc::new(StaticBlacklist::parse("10.0.0.2")?))
        .run(Some(&mut ports), None, None)
        .await;

    assert_eq!(prober.call_count(), 1);
    assert_eq!(ports.port_attrs("10.0.0.1", 80).unwrap().len(), 1);
    assert!(ports.port_attrs("10.0.0.2", 80).unwrap().is_empty());
    Ok(())
}

/// Many ports of one domain all merge into the same attribute list.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn shared_domain_key_loses_no_entries() {
    const PORTS: u16 = 40;
    const NAMES: [&str; 3] = ["nginx", "php", "wordpress"];

    for _round in 0..10 {
        let prober = Arc::new(
            FakeProber::default()
                .with_default(&NAMES)
                .with_delay(Duration::from_millis(1)),
        );
        let mut domains = DomainScanResult::new();
        domains.add_domain("example.com");
        let mut domain_ports = DomainTargetPort::new();
        domain_ports.insert(
            "example.com".to_string(),
            (9000..9000 + PORTS).collect::<BTreeSet<u16>>(),
        );
        let cfg = Config {
            performance: PerformanceMode::High,
            ..Config::default()
        };

        hub(&prober, &cfg)
            .run(None, Some(&mut domains), Some(&domain_ports))
            .await;

        let attrs = domains.domain_attrs("example.com").unwrap();
        assert_eq!(attrs.len(), PORTS as usize * NAMES.len());
        // Names from one probe stay adjacent and in engine order.
        for chunk in attrs.chunks(NAMES.len()) {
            let contents: Vec<&str> = chunk.iter().map(|a| a.content.as_str()).collect();
            assert_eq!(contents, NAMES);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn low_profile_bounds_in_flight_probes() {
    let prober = Arc::new(FakeProber::default().with_delay(Duration::from_millis(10)));
    let mut ports = PortScanResult::new();
    for last in 1..=30 {
        ports.add_port(&format!("10.0.1.{last}"), 80);
    }
    let cfg = Config {
        performance: PerformanceMode::Low,
        ..Config::default()
    };

    let hub = hub(&prober, &cfg);
    assert_eq!(hub.worker_count(), 2);
    hub.run(Some(&mut ports), None, None).await;

    assert_eq!(prober.call_count(), 30);
    assert!(prober.high_water() <= 2);
}
