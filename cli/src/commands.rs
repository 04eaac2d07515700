pub mod probe;
pub mod run;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use fphub_common::config::{Config, DEFAULT_ENGINE_DIR, PerformanceMode};

#[derive(Parser)]
#[command(name = "fphub")]
#[command(about = "Fingerprints the web services found by a port or domain scan.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Install directory of the fingerprint engine
    #[arg(long, global = true, env = "FPHUB_ENGINE_DIR", default_value = DEFAULT_ENGINE_DIR)]
    pub engine_dir: PathBuf,

    /// Engine binary, relative to the engine directory
    #[arg(long, global = true)]
    pub engine_bin: Option<PathBuf>,

    /// Directory for the engine's temporary result files
    #[arg(long, global = true)]
    pub scratch_dir: Option<PathBuf>,

    /// Kill a probe that runs longer than this
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// More output (-v debug, -vv trace). RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fingerprint every open port and domain in a scan result file
    #[command(alias = "r")]
    Run(RunArgs),
    /// Fingerprint a single target, e.g. 10.0.0.1:8080 or https://example.com
    #[command(alias = "p")]
    Probe { url: String },
}

#[derive(Args)]
pub struct RunArgs {
    /// Scan result document (JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the updated document here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Addresses, CIDR blocks, domains and .suffix rules, one per line
    #[arg(short, long)]
    pub blacklist: Option<PathBuf>,

    /// Worker profile: low, normal or high
    #[arg(long, default_value_t = PerformanceMode::Normal)]
    pub performance: PerformanceMode,

    /// Overrides the profile's worker ceiling
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Skip IP web ports already covered by a resolved domain
    #[arg(long)]
    pub optimize: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Engine settings shared by every subcommand.
    pub fn config(&self) -> Config {
        Config {
            engine_dir: self.engine_dir.clone(),
            engine_bin: self.engine_bin.clone(),
            scratch_dir: self.scratch_dir.clone(),
            probe_timeout: self.timeout.map(Duration::from_secs),
            ..Config::default()
        }
    }
}

impl RunArgs {
    pub fn apply(&self, base: &Config) -> Config {
        Config {
            performance: self.performance,
            max_workers: self.workers,
            optimization_mode: self.optimize,
            ..base.clone()
        }
    }
}
