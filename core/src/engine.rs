//! # ObserverWard adapter
//!
//! The subprocess-backed [`Prober`]. Each probe runs
//! `<engine> -t <url> -j <scratch file>` with the engine's install directory as the
//! working directory, waits for it, then reads the JSON array the engine left in
//! the scratch file.
//!
//! The engine resolves its fingerprint database relative to its working directory.
//! Running it from anywhere else does not fail; it just identifies far less. For the
//! same reason every path handed to it is absolute.
//!
//! The engine's stdout goes to our stdout by default. With
//! [`ObserverWard::with_logged_stdout`] it is captured instead and replayed line by
//! line through `tracing`, which keeps it from drawing over a live progress display.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use fphub_common::config::Config;
use fphub_common::error::ProbeError;
use fphub_common::fingerprint::{ProbeResult, Prober};

mod scratch;

pub use scratch::ScratchFile;

/// Recorded as the `source` of every attribute found by this engine.
pub const ENGINE_SOURCE: &str = "ObserverWard";

#[cfg(windows)]
const ENGINE_BINARY: &str = "observer_ward.exe";
#[cfg(not(windows))]
const ENGINE_BINARY: &str = "observer_ward";

#[derive(Debug, Clone)]
pub struct ObserverWard {
    engine_dir: PathBuf,
    binary: PathBuf,
    scratch_dir: PathBuf,
    timeout: Option<Duration>,
    log_stdout: bool,
}

impl ObserverWard {
    /// Uses the default binary name inside `engine_dir`, made absolute.
    pub fn new(engine_dir: impl AsRef<Path>) -> io::Result<Self> {
        let engine_dir = std::path::absolute(engine_dir)?;
        let binary = engine_dir.join(ENGINE_BINARY);
        Ok(Self {
            engine_dir,
            binary,
            scratch_dir: std::env::temp_dir(),
            timeout: None,
            log_stdout: false,
        })
    }

    pub fn from_config(cfg: &Config) -> io::Result<Self> {
        let mut engine = Self::new(&cfg.engine_dir)?;
        if let Some(binary) = &cfg.engine_bin {
            engine = engine.with_binary(binary);
        }
        if let Some(dir) = &cfg.scratch_dir {
            engine = engine.with_scratch_dir(dir)?;
        }
        if let Some(limit) = cfg.probe_timeout {
            engine = engine.with_timeout(limit);
        }
        Ok(engine)
    }

    /// Relative paths are taken relative to the engine directory.
    pub fn with_binary(mut self, binary: impl AsRef<Path>) -> Self {
        self.binary = self.engine_dir.join(binary);
        self
    }

    /// Relative paths are resolved against the current directory, not the engine's.
    pub fn with_scratch_dir(mut self, dir: impl AsRef<Path>) -> io::Result<Self> {
        self.scratch_dir = std::path::absolute(dir)?;
        Ok(self)
    }

    /// Kills the engine if it runs longer than `limit`.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Replays the engine's stdout through `tracing` instead of inheriting it.
    pub fn with_logged_stdout(mut self) -> Self {
        self.log_stdout = true;
        self
    }

    pub fn engine_dir(&self) -> &Path {
        &self.engine_dir
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    async fn run_engine(&self, url: &str, output: &Path) -> Result<(), ProbeError> {
        let launch_error = |source: io::Error| ProbeError::Launch {
            binary: self.binary.clone(),
            source,
        };

        let stdout = if self.log_stdout {
            Stdio::piped()
        } else {
            Stdio::inherit()
        };
        let child = Command::new(&self.binary)
            .arg("-t")
            .arg(url)
            .arg("-j")
            .arg(output)
            .current_dir(&self.engine_dir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(launch_error)?;

        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| ProbeError::Timeout(limit))?,
            None => child.wait_with_output().await,
        };
        let finished = waited.map_err(launch_error)?;

        for line in String::from_utf8_lossy(&finished.stdout).lines() {
            let line = line.trim_end();
            if !line.is_empty() {
                info!("[{url}] {line}");
            }
        }

        if !finished.status.success() {
            return Err(ProbeError::Exit {
                status: finished.status,
                stderr: String::from_utf8_lossy(&finished.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Prober for ObserverWard {
    fn source(&self) -> &str {
        ENGINE_SOURCE
    }

    async fn probe(&self, url: &str) -> Result<Vec<ProbeResult>, ProbeError> {
        let scratch = ScratchFile::allocate(&self.scratch_dir);
        self.run_engine(url, scratch.path()).await?;
        read_results(scratch.path()).await
    }
}

/// Reads an engine result file. A missing or blank file means "nothing found".
pub async fn read_results(path: &Path) -> Result<Vec<ProbeResult>, ProbeError> {
    match tokio::fs::read(path).await {
        Ok(content) => parse_results(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(source) => Err(ProbeError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn parse_results(content: &[u8]) -> Result<Vec<ProbeResult>, ProbeError> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(content)?)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
