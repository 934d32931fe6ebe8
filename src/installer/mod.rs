//! Download, removal, and extraction steps of an install.
//!
//! Each step is a free function so the [`Updater`](crate::updater::Updater)
//! reads as the sequence it performs:
//!
//! ```text
//! download_archive   -> <download_path>/<package>-<version>.zip (skipped when cached)
//! remove_install_dirs -> <AddOns>/<Package>, <AddOns>/<Package>_OptionsUI
//! extract_archive    -> <AddOns>/
//! ```
//!
//! [`UpdateLock`] serializes overlapping runs around the whole sequence.

mod archive;
mod download;
pub mod lock;

pub use archive::{extract_archive, extract_archive_blocking};
pub use download::download_archive;
pub use lock::UpdateLock;

use crate::core::UpdaterError;
use std::path::PathBuf;
use tracing::debug;

/// Recursively removes each directory, ignoring ones that do not exist.
///
/// # Errors
///
/// Returns [`UpdaterError::Filesystem`] for any failure other than "not found".
pub async fn remove_install_dirs(dirs: &[PathBuf]) -> Result<(), UpdaterError> {
    for dir in dirs {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => debug!("Removed {}", dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Nothing to remove at {}", dir.display());
            }
            Err(e) => return Err(UpdaterError::io("remove directory", dir, e)),
        }
    }
    Ok(())
}
