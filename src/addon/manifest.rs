//! Installed version discovery.

use super::AddonLayout;
use crate::core::UpdaterError;
use crate::version::AddonVersion;
use tracing::{debug, info};

/// Reads the installed add-on version from its `.toc` manifest.
///
/// A missing manifest means the add-on has not been installed yet and yields
/// [`AddonVersion::not_installed`] instead of an error.
///
/// # Errors
///
/// - [`UpdaterError::ManifestVersionNotFound`] if the manifest exists but has
///   no `Version: NN.NN` declaration
/// - [`UpdaterError::Filesystem`] for any other read failure
pub async fn installed_version(layout: &AddonLayout) -> Result<AddonVersion, UpdaterError> {
    let path = layout.manifest_path();
    debug!("Reading manifest {}", path.display());

    let content = match tokio::fs::read(&path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("Currently installed {} version not found.", layout.package());
            return Ok(AddonVersion::not_installed());
        }
        Err(e) => return Err(UpdaterError::io("read manifest", path, e)),
    };

    AddonVersion::from_manifest(&content).ok_or(UpdaterError::ManifestVersionNotFound { path })
}
