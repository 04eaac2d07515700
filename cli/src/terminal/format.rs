use colored::*;

use fphub_common::fingerprint::ProbeResult;
use fphub_common::network::target::format_host_url;
use fphub_common::scan::{Attribute, ScanInput};
use fphub_core::merge::FINGERPRINT_TAG;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

/// A scan record that carries at least one fingerprint.
pub struct Fingerprinted<'a> {
    pub label: String,
    pub attrs: Vec<&'a Attribute>,
}

/// Every port and domain record with fingerprint attributes, IPs first.
pub fn fingerprinted(input: &ScanInput) -> Vec<Fingerprinted<'_>> {
    let mut rows = Vec::new();

    if let Some(ports) = &input.ports {
        for (ip, ip_result) in &ports.ip_result {
            for (port, port_result) in &ip_result.ports {
                push_row(&mut rows, format_host_url(None, ip, *port), &port_result.attrs);
            }
        }
    }
    if let Some(domains) = &input.domains {
        for (domain, domain_result) in &domains.domain_result {
            push_row(&mut rows, domain.clone(), &domain_result.attrs);
        }
    }
    rows
}

fn push_row<'a>(rows: &mut Vec<Fingerprinted<'a>>, label: String, attrs: &'a [Attribute]) {
    let attrs: Vec<&Attribute> = attrs.iter().filter(|a| a.tag == FINGERPRINT_TAG).collect();
    if !attrs.is_empty() {
        rows.push(Fingerprinted { label, attrs });
    }
}

pub fn fingerprint_details(row: &Fingerprinted<'_>) -> Vec<Detail> {
    let names: Vec<&str> = row.attrs.iter().map(|a| a.content.as_str()).collect();
    let mut sources: Vec<&str> = row.attrs.iter().map(|a| a.source.as_str()).collect();
    sources.dedup();

    vec![
        ("Finger".to_string(), names.join(", ").color(colors::FINGERPRINT)),
        ("Source".to_string(), sources.join(", ").normal()),
    ]
}

pub fn probe_result_details(result: &ProbeResult) -> Vec<Detail> {
    let status = result.status_code.to_string();
    let status = if (200..300).contains(&result.status_code) {
        status.color(colors::STATUS_OK)
    } else {
        status.color(colors::STATUS_OTHER)
    };

    let mut details: Vec<Detail> = vec![("Status".to_string(), status)];
    if !result.title.is_empty() {
        details.push(("Title".to_string(), result.title.as_str().normal()));
    }
    details.push((
        "Finger".to_string(),
        result.name.join(", ").color(colors::FINGERPRINT),
    ));
    if !result.plugins.is_empty() {
        details.push(("Plugins".to_string(), result.plugins.join(", ").normal()));
    }
    details.push(("Length".to_string(), result.length.to_string().normal()));
    details
}
