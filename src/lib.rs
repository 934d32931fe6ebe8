//! addon-updater - keeps a World of Warcraft add-on in sync with its download page
//!
//! The updater compares the version declared in the installed add-on's `.toc`
//! manifest with the newest archive linked from the add-on's download page.
//! When they differ it downloads the archive (unless it is already cached),
//! removes the installed package directories, and extracts the new release.
//!
//! # Architecture Overview
//!
//! ```text
//! cli ──> config ──> updater ──┬──> addon      (layout + installed version)
//!                              ├──> source     (download page scraping, HTTP)
//!                              └──> installer  (lock, download, remove, extract)
//! ```
//!
//! # Core Modules
//!
//! - [`addon`] - Installed add-on layout and manifest reading
//! - [`cli`] - Command-line interface and exit code mapping
//! - [`config`] - Defaults, TOML config file, and CLI override layering
//! - [`core`] - Error types, error classification, and user-facing error display
//! - [`installer`] - Run lock, archive download, directory removal, extraction
//! - [`logging`] - Append-only log file setup
//! - [`source`] - Latest release discovery from the download page
//! - [`updater`] - The update workflow tying everything together
//! - [`version`] - `NN.NN` add-on version extraction
//!
//! # Example
//!
//! ```rust,no_run
//! use addon_updater::config::UpdaterConfig;
//! use addon_updater::updater::{InstallOutcome, Updater};
//!
//! # async fn example() -> Result<(), addon_updater::core::UpdaterError> {
//! let config = UpdaterConfig::new("/games/World of Warcraft").with_download_path("/tmp");
//! let mut updater = Updater::new(config).await?;
//! match updater.install().await? {
//!     InstallOutcome::UpToDate { version } => println!("already on {version}"),
//!     InstallOutcome::Installed { version, .. } => println!("installed {version}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod addon;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod installer;
pub mod logging;
pub mod source;
pub mod updater;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
