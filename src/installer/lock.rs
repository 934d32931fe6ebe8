//! Run-level file locking so overlapping scheduled runs do not interleave.
//!
//! The lock lives in the archive storage directory as
//! [`LOCK_FILE_NAME`](crate::constants::LOCK_FILE_NAME) and is released when the
//! [`UpdateLock`] is dropped. The file itself is left in place between runs.

use crate::constants::{LOCK_FILE_NAME, MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS};
use crate::core::UpdaterError;
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

/// An exclusive lock held for the duration of an install.
///
/// # Example
///
/// ```rust,no_run
/// use addon_updater::installer::UpdateLock;
/// use std::path::Path;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), addon_updater::core::UpdaterError> {
/// let _lock = UpdateLock::acquire(Path::new("."), Duration::from_secs(60)).await?;
/// // download, remove, extract...
/// // Lock is released when _lock goes out of scope
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UpdateLock {
    /// The file handle - lock is released when this is dropped
    _file: Arc<File>,
    /// Path to the lock file for tracing
    lock_path: PathBuf,
}

impl Drop for UpdateLock {
    fn drop(&mut self) {
        // The file itself stays: unlinking it would let a third run lock a fresh
        // inode while a second run still waits on the old one.
        debug!(lock = %self.lock_path.display(), "Update lock released");
    }
}

impl UpdateLock {
    /// Acquires the update lock in `dir`, waiting up to `timeout`.
    ///
    /// Uses non-blocking lock attempts with exponential backoff
    /// (10ms → 20ms → 40ms... up to 500ms).
    ///
    /// # Errors
    ///
    /// - [`UpdaterError::Filesystem`] if the lock file cannot be opened
    /// - [`UpdaterError::LockTimeout`] if another run holds the lock past `timeout`
    pub async fn acquire(dir: &Path, timeout: Duration) -> Result<Self, UpdaterError> {
        let lock_path = dir.join(LOCK_FILE_NAME);
        debug!(lock = %lock_path.display(), "Waiting for update lock");

        let open_path = lock_path.clone();
        let file = tokio::task::spawn_blocking(move || {
            OpenOptions::new().create(true).write(true).truncate(false).open(&open_path)
        })
        .await
        .map_err(|e| UpdaterError::io("open lock file", &lock_path, std::io::Error::other(e)))?
        .map_err(|e| UpdaterError::io("open lock file", &lock_path, e))?;

        let file = Arc::new(file);
        let start = std::time::Instant::now();

        let backoff = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS)
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS));

        for delay in backoff {
            let file_clone = Arc::clone(&file);
            let lock_result = tokio::task::spawn_blocking(move || file_clone.try_lock_exclusive())
                .await
                .map_err(|e| {
                    UpdaterError::io("lock", &lock_path, std::io::Error::other(e))
                })?;

            match lock_attempt(lock_result, &lock_path)? {
                true => {
                    debug!(
                        lock = %lock_path.display(),
                        wait_ms = start.elapsed().as_millis(),
                        "Update lock acquired"
                    );
                    return Ok(Self {
                        _file: file,
                        lock_path,
                    });
                }
                false => {
                    let remaining = timeout.saturating_sub(start.elapsed());
                    if remaining.is_zero() {
                        return Err(UpdaterError::LockTimeout {
                            path: lock_path,
                            timeout,
                        });
                    }
                    tokio::time::sleep(delay.min(remaining)).await;
                }
            }
        }

        Err(UpdaterError::LockTimeout {
            path: lock_path,
            timeout,
        })
    }
}

/// `true` when acquired, `false` when another run holds the lock.
///
/// Anything other than contention (unsupported filesystem, bad handle) fails
/// immediately instead of being retried until the timeout.
fn lock_attempt(result: std::io::Result<bool>, lock_path: &Path) -> Result<bool, UpdaterError> {
    result.map_err(|e| UpdaterError::io("lock", lock_path, e))
}
