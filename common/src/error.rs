use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Why a single probe produced no results.
///
/// None of these are fatal to a dispatch run; the dispatcher logs them and
/// moves on to the next target.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run {}: {source}", .binary.display())]
    Launch {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("engine exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },

    #[error("engine did not finish within {0:?}")]
    Timeout(Duration),

    #[error("failed to read engine output {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed engine output: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum BlacklistError {
    #[error("invalid blacklist entry on line {line}: {entry}")]
    InvalidEntry { line: usize, entry: String },

    #[error("failed to read blacklist: {0}")]
    Io(#[from] io::Error),
}
