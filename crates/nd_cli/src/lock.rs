use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use nd_core::Result;
use tracing::{info, warn};

pub const DEFAULT_LOCKFILE: &str = "newsdigest.lock";

/// Advisory exclusive lock on the lockfile, held for the duration of a run.
///
/// The OS drops the lock when the process exits, so a file left behind by a
/// crashed run does not block the next one.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Locks the lockfile. Returns `None` if another run already holds it.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let mut file = OpenOptions::new().read(true).write(true).create(true).open(path)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Ok(None);
            }
            return Err(e.into());
        }

        file.set_len(0)?;
        write!(file, "{}", std::process::id())?;
        Ok(Some(Self {
            file,
            path: path.to_path_buf(),
        }))
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        match self.file.unlock() {
            Ok(()) => info!("Lockfile {} released at {}", self.path.display(), chrono::Local::now()),
            Err(e) => warn!("Failed to unlock {}: {}", self.path.display(), e),
        }
    }
}
