//! A blacklist loaded from plain text.
//!
//! One entry per line, `#` starts a comment:
//!
//! ```text
//! 10.0.0.5          # single address
//! 192.168.0.0/16    # CIDR block
//! intranet.corp     # exact domain
//! .gov.example      # the domain and every subdomain
//! ```

use std::collections::HashSet;
use std::net::IpAddr;
use std::path::Path;

use pnet::ipnetwork::IpNetwork;

use fphub_common::error::BlacklistError;
use fphub_common::policy::Blacklist;

#[derive(Debug, Clone, Default)]
pub struct StaticBlacklist {
    ips: HashSet<IpAddr>,
    networks: Vec<IpNetwork>,
    domains: HashSet<String>,
    suffixes: Vec<String>,
}

impl StaticBlacklist {
    pub fn parse(text: &str) -> Result<Self, BlacklistError> {
        let mut blacklist = Self::default();
        for (idx, line) in text.lines().enumerate() {
            let entry = line.split('#').next().unwrap_or_default().trim();
            if entry.is_empty() {
                continue;
            }
            if !blacklist.insert(entry) {
                return Err(BlacklistError::InvalidEntry {
                    line: idx + 1,
                    entry: entry.to_string(),
                });
            }
        }
        Ok(blacklist)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BlacklistError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Adds one entry. Returns `false` if it is neither an address, a CIDR block nor a domain.
    pub fn insert(&mut self, entry: &str) -> bool {
        if entry.contains('/') {
            return match entry.parse::<IpNetwork>() {
                Ok(network) => {
                    self.networks.push(network);
                    true
                }
                Err(_) => false,
            };
        }
        if let Ok(ip) = entry.parse::<IpAddr>() {
            self.ips.insert(ip);
            return true;
        }

        let domain = normalize_domain(entry);
        match domain.strip_prefix('.') {
            Some(apex) if is_domain(apex) => {
                self.suffixes.push(domain);
                true
            }
            Some(_) => false,
            None if is_domain(&domain) => {
                self.domains.insert(domain);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.ips.len() + self.networks.len() + self.domains.len() + self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Blacklist for StaticBlacklist {
    fn is_blacklisted(&self, addr: &str) -> bool {
        if let Ok(ip) = addr.parse::<IpAddr>() {
            return self.ips.contains(&ip) || self.networks.iter().any(|net| net.contains(ip));
        }

        let domain = normalize_domain(addr);
        self.domains.contains(&domain)
            || self
                .suffixes
                .iter()
                .any(|suffix| domain.ends_with(suffix.as_str()) || domain == suffix[1..])
    }
}

fn normalize_domain(s: &str) -> String {
    s.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn is_domain(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}
