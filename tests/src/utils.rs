#![cfg(test)]
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fphub_common::error::ProbeError;
use fphub_common::fingerprint::{ProbeResult, Prober};

pub const FAKE_SOURCE: &str = "FakeEngine";

/// In-memory engine: answers from a table, or with `default_names` for unknown URLs.
#[derive(Default)]
pub struct FakeProber {
    pub answers: HashMap<String, Vec<String>>,
    pub default_names: Vec<String>,
    pub delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    high_water: AtomicUsize,
}

impl FakeProber {
    pub fn with_answer(mut self, url: &str, names: &[&str]) -> Self {
        self.answers.insert(url.to_string(), to_strings(names));
        self
    }

    pub fn with_default(mut self, names: &[&str]) -> Self {
        self.default_names = to_strings(names);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn high_water(&self) -> usize {
        self.high_water.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for FakeProber {
    fn source(&self) -> &str {
        FAKE_SOURCE
    }

    async fn probe(&self, url: &str) -> Result<Vec<ProbeResult>, ProbeError> {
        self.calls.lock().unwrap().push(url.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.high_water.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let name = self
            .answers
            .get(url)
            .cloned()
            .unwrap_or_else(|| self.default_names.clone());
        Ok(vec![ProbeResult {
            url: url.to_string(),
            name,
            status_code: 200,
            ..ProbeResult::default()
        }])
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
