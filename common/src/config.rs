use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default install directory of the fingerprint engine, relative to the working directory.
pub const DEFAULT_ENGINE_DIR: &str = "thirdparty/fingerprinthub";

/// Named worker profile. Each profile maps to a fixed probe ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PerformanceMode {
    Low,
    #[default]
    Normal,
    High,
}

impl PerformanceMode {
    /// Number of probes allowed in flight at once.
    pub fn worker_count(self) -> usize {
        match self {
            PerformanceMode::Low => 2,
            PerformanceMode::Normal => 4,
            PerformanceMode::High => 8,
        }
    }
}

impl FromStr for PerformanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(PerformanceMode::Low),
            "normal" => Ok(PerformanceMode::Normal),
            "high" => Ok(PerformanceMode::High),
            _ => Err(format!("unknown performance mode: {s}")),
        }
    }
}

impl fmt::Display for PerformanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PerformanceMode::Low => "low",
            PerformanceMode::Normal => "normal",
            PerformanceMode::High => "high",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Install directory of the engine. Probes run with this as their working directory.
    pub engine_dir: PathBuf,
    /// Engine binary. Relative paths are resolved against `engine_dir`.
    pub engine_bin: Option<PathBuf>,
    /// Where scratch result files are written. Defaults to the OS temp directory.
    pub scratch_dir: Option<PathBuf>,
    pub performance: PerformanceMode,
    /// Overrides the ceiling derived from `performance`.
    pub max_workers: Option<usize>,
    /// Skips targets the optimization policy marks as redundant.
    pub optimization_mode: bool,
    /// Per-probe deadline. `None` waits for the engine however long it takes.
    pub probe_timeout: Option<Duration>,
}

impl Config {
    /// Effective worker ceiling, never below one.
    pub fn worker_count(&self) -> usize {
        self.max_workers
            .unwrap_or_else(|| self.performance.worker_count())
            .max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_dir: PathBuf::from(DEFAULT_ENGINE_DIR),
            engine_bin: None,
            scratch_dir: None,
            performance: PerformanceMode::default(),
            max_workers: None,
            optimization_mode: false,
            probe_timeout: None,
        }
    }
}
