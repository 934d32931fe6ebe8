//! The update workflow.
//!
//! Constructing an [`Updater`] validates the configured paths and resolves
//! both versions: the installed one from the add-on manifest and the latest
//! one from the download page. [`Updater::install`] then brings the
//! installation up to date:
//!
//! ```text
//! installed == latest ─────────────────────────────> UpToDate
//!        │
//!        └─ lock ─> archive cached? ─no─> download ─┐
//!                        │                          │
//!                        └─yes──────────────────────┴─> remove old dirs ─> extract ─> Installed
//! ```
//!
//! Every failure is logged with its full cause chain before it is returned.

use crate::addon::{AddonLayout, installed_version};
use crate::config::UpdaterConfig;
use crate::core::{UpdaterError, error_chain};
use crate::installer::{UpdateLock, download_archive, extract_archive, remove_install_dirs};
use crate::source::{DownloadPage, RemoteRelease, http};
use crate::version::AddonVersion;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{Instrument, Span, debug, error, info, info_span};

/// Where an [`Updater`] is in its workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    /// Both versions are known; nothing has been installed yet
    Ready,
    /// The installed version already matched the latest
    UpToDate,
    /// The latest archive was extracted
    Installed,
    /// The last install attempt failed
    Failed,
}

/// Result of a successful [`Updater::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Nothing was changed
    UpToDate {
        /// The installed (and latest) version
        version: AddonVersion,
    },
    /// The latest version was extracted over the old one
    Installed {
        /// The version now installed
        version: AddonVersion,
        /// `false` when a cached archive was reused
        downloaded: bool,
    },
}

/// Keeps one add-on installation in sync with its download page.
///
/// # Example
///
/// ```rust,no_run
/// use addon_updater::config::UpdaterConfig;
/// use addon_updater::updater::Updater;
///
/// # async fn example() -> Result<(), addon_updater::core::UpdaterError> {
/// let config = UpdaterConfig::new("/games/World of Warcraft");
/// let mut updater = Updater::new(config).await?;
/// println!("{} -> {}", updater.installed_version(), updater.latest_version());
/// updater.install().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Updater {
    config: UpdaterConfig,
    layout: AddonLayout,
    client: Client,
    installed: AddonVersion,
    latest: RemoteRelease,
    state: UpdateState,
    span: Span,
}

impl Updater {
    /// Validates `config` and discovers the installed and latest versions.
    ///
    /// # Errors
    ///
    /// - [`UpdaterError::PathNotFound`] if the installation root or download
    ///   path does not exist
    /// - [`UpdaterError::ManifestVersionNotFound`] if the manifest has no version
    /// - any network or scrape error from reading the download page
    pub async fn new(config: UpdaterConfig) -> Result<Self, UpdaterError> {
        let client = http::build_client(config.http_timeout)?;
        Self::with_client(config, client).await
    }

    /// Same as [`new`](Self::new) with a caller-supplied HTTP client.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub async fn with_client(config: UpdaterConfig, client: Client) -> Result<Self, UpdaterError> {
        let span = info_span!("updater", package = %config.package);
        let result = Self::discover(config, client, span.clone()).instrument(span.clone()).await;

        if let Err(e) = &result {
            span.in_scope(|| error!("{}", error_chain(e)));
        }
        result
    }

    async fn discover(config: UpdaterConfig, client: Client, span: Span) -> Result<Self, UpdaterError> {
        require_path("installation root", &config.wow_path).await?;
        require_path("download path", &config.download_path).await?;

        let layout = AddonLayout::from_config(&config);
        let installed = installed_version(&layout).await?;
        if installed.is_installed() {
            info!("Currently installed {} version: {installed}", layout.package());
        }

        let page = DownloadPage::new(&config.url, &config.archive_extension, config.http_timeout);
        let latest = page.latest_release(&client).await?;

        Ok(Self {
            config,
            layout,
            client,
            installed,
            latest,
            state: UpdateState::Ready,
            span,
        })
    }

    /// The version found in the manifest, `0.0` when not installed.
    pub fn installed_version(&self) -> &AddonVersion {
        &self.installed
    }

    /// The version offered by the download page.
    pub fn latest_version(&self) -> &AddonVersion {
        &self.latest.version
    }

    /// The absolute URL of the latest archive.
    pub fn download_url(&self) -> &str {
        &self.latest.download_url
    }

    /// Whether the installed version equals the latest one.
    pub fn is_up_to_date(&self) -> bool {
        self.installed == self.latest.version
    }

    /// Current workflow state.
    pub fn state(&self) -> UpdateState {
        self.state
    }

    /// Paths this updater reads and writes.
    pub fn layout(&self) -> &AddonLayout {
        &self.layout
    }

    /// Where the latest archive is (or will be) stored.
    pub fn archive_path(&self) -> PathBuf {
        self.config.download_path.join(self.layout.archive_file_name(&self.latest.version))
    }

    /// Installs the latest version unless it is already installed.
    ///
    /// # Errors
    ///
    /// Any download, removal, extraction, or locking failure. The error has
    /// already been logged when it is returned.
    pub async fn install(&mut self) -> Result<InstallOutcome, UpdaterError> {
        self.install_with(false).await
    }

    /// Like [`install`](Self::install); with `force` the latest version is
    /// reinstalled even when it matches the installed one.
    ///
    /// # Errors
    ///
    /// See [`install`](Self::install).
    pub async fn install_with(&mut self, force: bool) -> Result<InstallOutcome, UpdaterError> {
        let span = self.span.clone();
        let result = self.run_install(force).instrument(span.clone()).await;

        self.state = match &result {
            Ok(InstallOutcome::UpToDate { .. }) => UpdateState::UpToDate,
            Ok(InstallOutcome::Installed { .. }) => UpdateState::Installed,
            Err(e) => {
                span.in_scope(|| error!("{}", error_chain(e)));
                UpdateState::Failed
            }
        };
        result
    }

    async fn run_install(&mut self, force: bool) -> Result<InstallOutcome, UpdaterError> {
        if self.is_up_to_date() && !force {
            info!("Already at latest version: {}.", self.latest.version);
            return Ok(InstallOutcome::UpToDate {
                version: self.latest.version.clone(),
            });
        }

        let _lock = UpdateLock::acquire(&self.config.download_path, self.config.lock_timeout).await?;

        // Another run may have finished the same update while we waited.
        if !force {
            self.installed = installed_version(&self.layout).await?;
            if self.is_up_to_date() {
                info!("Already at latest version: {}.", self.latest.version);
                return Ok(InstallOutcome::UpToDate {
                    version: self.latest.version.clone(),
                });
            }
        }

        let archive = self.archive_path();
        let downloaded = if is_file(&archive).await {
            info!("Latest version already downloaded: {}!", archive.display());
            false
        } else {
            info!("Downloading latest version: {}...", self.latest.version);
            download_archive(
                &self.client,
                &self.latest.download_url,
                &archive,
                self.config.http_timeout,
            )
            .await?;
            true
        };

        info!("Installing...");
        remove_install_dirs(&self.layout.install_dirs()).await?;
        let files = extract_archive(&archive, &self.layout.addons_dir()).await?;
        debug!(files, "Archive extracted");

        self.installed = self.latest.version.clone();
        info!("Done!");
        Ok(InstallOutcome::Installed {
            version: self.latest.version.clone(),
            downloaded,
        })
    }
}

async fn require_path(what: &'static str, path: &Path) -> Result<(), UpdaterError> {
    match tokio::fs::metadata(path).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(UpdaterError::PathNotFound {
            what,
            path: path.to_path_buf(),
        }),
        Err(e) => Err(UpdaterError::io("inspect", path, e)),
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}
