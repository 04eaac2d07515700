//! The probe seam: one URL in, the engine's identifications out.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ProbeError;

/// One finding reported by the fingerprint engine.
///
/// Missing fields and explicit `null`s both take the field's default, so engine
/// builds that omit or blank some of them still parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeResult {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Identified products and technologies, in engine order.
    #[serde(deserialize_with = "null_as_default")]
    pub name: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub length: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_code: u16,
    #[serde(deserialize_with = "null_as_default")]
    pub plugins: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Runs a fingerprint probe against a single URL-shaped target.
///
/// Implementations must be safe to call concurrently; the dispatcher shares one
/// prober across all of its workers.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Identifier recorded as the `source` of every attribute this prober produces.
    fn source(&self) -> &str;

    async fn probe(&self, url: &str) -> Result<Vec<ProbeResult>, ProbeError>;
}
