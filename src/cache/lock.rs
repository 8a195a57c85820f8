//! Process-level locking of the dependency cache.
//!
//! Fetching and reconciliation both rewrite directories below the cache root, so they run
//! while holding an exclusive lock on `<cache>/.gopm.lock`. The lock is released when the
//! [`CacheLock`] is dropped.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Name of the lock file below the cache root.
pub const LOCK_FILE_NAME: &str = ".gopm.lock";

/// An exclusive lock on a cache directory.
#[derive(Debug)]
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Acquires the lock on `cache_dir`, creating the directory when missing.
    ///
    /// Waits while another process holds it. The blocking wait runs on the blocking thread
    /// pool so the runtime keeps making progress.
    ///
    /// ```rust,no_run
    /// use gopm::cache::CacheLock;
    /// use std::path::Path;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let lock = CacheLock::acquire(Path::new("vendor")).await?;
    /// // ... rewrite the cache ...
    /// drop(lock);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn acquire(cache_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(cache_dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotADirectory {
                anyhow::anyhow!(
                    "Cannot create directory: cache path is not a directory ({})",
                    cache_dir.display()
                )
            } else if e.kind() == std::io::ErrorKind::PermissionDenied {
                anyhow::anyhow!("Permission denied: cannot create cache directory at {}", cache_dir.display())
            } else {
                anyhow::anyhow!("Failed to create directory {}: {}", cache_dir.display(), e)
            }
        })?;

        let path = cache_dir.join(LOCK_FILE_NAME);
        let lock_path = path.clone();
        let file = tokio::task::spawn_blocking(move || -> Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&lock_path)
                .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;
            file.lock_exclusive()
                .with_context(|| format!("Failed to lock {}", lock_path.display()))?;
            Ok(file)
        })
        .await
        .context("Failed to spawn blocking task for lock acquisition")??;

        tracing::trace!("Locked {}", path.display());
        Ok(Self {
            file,
            path,
        })
    }

    /// The lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        #[allow(unstable_name_collisions)]
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}
