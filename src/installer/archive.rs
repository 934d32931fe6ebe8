use crate::core::UpdaterError;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;

/// Extracts every entry of a zip archive into `destination`.
///
/// Runs [`extract_archive_blocking`] on the blocking thread pool.
///
/// # Errors
///
/// See [`extract_archive_blocking`].
pub async fn extract_archive(archive: &Path, destination: &Path) -> Result<usize, UpdaterError> {
    let archive = archive.to_path_buf();
    let destination = destination.to_path_buf();
    let archive_for_error = archive.clone();

    tokio::task::spawn_blocking(move || extract_archive_blocking(&archive, &destination))
        .await
        .map_err(|e| {
            UpdaterError::io("extract archive", archive_for_error, std::io::Error::other(e))
        })?
}

/// Extracts every entry of a zip archive into `destination`, returning the
/// number of files written.
///
/// Entries whose names would escape `destination` (absolute paths or `..`
/// components) are skipped with a warning. Existing files are overwritten.
/// On Unix, stored permission bits are restored.
///
/// # Errors
///
/// - [`UpdaterError::Filesystem`] if the archive cannot be opened or a file
///   cannot be written
/// - [`UpdaterError::Archive`] if the archive is not a valid zip file
pub fn extract_archive_blocking(archive: &Path, destination: &Path) -> Result<usize, UpdaterError> {
    let file = File::open(archive).map_err(|e| UpdaterError::io("open archive", archive, e))?;
    let zip_error = |source: zip::result::ZipError| UpdaterError::Archive {
        path: archive.to_path_buf(),
        source,
    };
    let mut zip = ZipArchive::new(file).map_err(zip_error)?;

    std::fs::create_dir_all(destination)
        .map_err(|e| UpdaterError::io("create directory", destination, e))?;

    let mut written = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(zip_error)?;
        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping archive entry outside the target directory: {}", entry.name());
            continue;
        };
        let outpath: PathBuf = destination.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)
                .map_err(|e| UpdaterError::io("create directory", &outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| UpdaterError::io("create directory", parent, e))?;
        }
        let mut outfile =
            File::create(&outpath).map_err(|e| UpdaterError::io("create", &outpath, e))?;
        std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| UpdaterError::io("write", &outpath, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                    .map_err(|e| UpdaterError::io("set permissions on", &outpath, e))?;
            }
        }

        written += 1;
    }

    debug!("Extracted {written} files from {} into {}", archive.display(), destination.display());
    Ok(written)
}
