use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// A per-probe result file, removed when dropped.
///
/// Names combine the process id, a process-wide sequence number and a random salt,
/// so concurrent probes (and concurrent processes sharing a directory) never collide.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn allocate(dir: &Path) -> Self {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        let salt: u32 = rand::random();
        let name = format!("fphub-{}-{seq}-{salt:08x}.json", std::process::id());
        Self {
            path: dir.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != io::ErrorKind::NotFound
        {
            debug!("failed to remove {}: {e}", self.path.display());
        }
    }
}
