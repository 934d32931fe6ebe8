//! Defaults and tuning values shared across the updater.
//!
//! Everything here that a user might reasonably want to change is also exposed
//! through [`crate::config`], so these are fallbacks rather than hard limits.

use std::time::Duration;

/// Download page scraped for the latest archive link.
pub const DEFAULT_PAGE_URL: &str = "https://www.tukui.org/download.php?ui=elvui";

/// Add-on directory name under `Interface/AddOns`.
pub const DEFAULT_PACKAGE: &str = "ElvUI";

/// Game client directory under the installation root.
pub const DEFAULT_CLIENT_DIR: &str = "_retail_";

/// Suffixes of sibling directories that ship with the package and are replaced with it.
pub const DEFAULT_COMPANION_SUFFIXES: &[&str] = &["_OptionsUI"];

/// Substring an anchor's `href` must contain to count as the download link.
pub const DEFAULT_ARCHIVE_EXTENSION: &str = ".zip";

/// Archive storage directory when none is given.
pub const DEFAULT_DOWNLOAD_PATH: &str = ".";

/// Log file written by every run.
pub const DEFAULT_LOG_FILE: &str = "update_elvui.log";

/// Name of the lock file created in the archive storage directory.
pub const LOCK_FILE_NAME: &str = ".addon-updater.lock";

/// Suffix for archives that are still being downloaded.
pub const PARTIAL_DOWNLOAD_SUFFIX: &str = ".part";

/// Version reported when the add-on manifest does not exist.
pub const NOT_INSTALLED_VERSION: &str = "0.0";

/// Default timeout applied to each HTTP request (30 seconds).
pub fn default_http_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Default time to wait for another run to release the update lock (60 seconds).
pub fn default_lock_timeout() -> Duration {
    Duration::from_secs(60)
}

/// Maximum backoff delay while waiting for the update lock (500ms).
pub const MAX_BACKOFF_DELAY_MS: u64 = 500;

/// Starting delay for the lock backoff (10ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 10;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = concat!("addon-updater/", env!("CARGO_PKG_VERSION"));
