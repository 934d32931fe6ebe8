//! Latest-release discovery from the add-on's download page.
//!
//! The page is plain HTML, not an API. Discovery is:
//!
//! 1. GET the page
//! 2. pick the first `<a href>` (document order) whose href contains the
//!    archive extension
//! 3. resolve the href against the page's directory
//! 4. read the first `NN.NN` from the resolved URL's path and query

pub mod http;
mod scrape;

pub use scrape::{find_download_link, page_directory, resolve_download_url};

use crate::core::UpdaterError;
use crate::version::AddonVersion;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::{Position, Url};

/// The newest archive offered by the download page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRelease {
    /// Version parsed from the link
    pub version: AddonVersion,
    /// Absolute archive URL
    pub download_url: String,
}

/// Where and how to look for the latest release.
#[derive(Debug, Clone)]
pub struct DownloadPage {
    url: String,
    archive_extension: String,
    timeout: Duration,
}

impl DownloadPage {
    /// A page at `url` whose archive links contain `archive_extension`.
    pub fn new(url: impl Into<String>, archive_extension: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            archive_extension: archive_extension.into(),
            timeout,
        }
    }

    /// Fetches the page and extracts the latest release.
    ///
    /// # Errors
    ///
    /// - [`UpdaterError::Timeout`] / [`UpdaterError::Network`] if the page cannot be fetched
    /// - [`UpdaterError::DownloadLinkNotFound`] if no anchor matches the extension
    /// - [`UpdaterError::RemoteVersionNotFound`] if the link has no `NN.NN` version
    pub async fn latest_release(&self, client: &Client) -> Result<RemoteRelease, UpdaterError> {
        debug!("Fetching download page {}", self.url);
        let html = http::get_text(client, &self.url, self.timeout).await?;
        debug!(bytes = html.len(), "Download page received");

        self.release_from_html(&html)
    }

    /// Extracts the latest release from an already fetched page body.
    ///
    /// # Errors
    ///
    /// Same scrape errors as [`latest_release`](Self::latest_release).
    pub fn release_from_html(&self, html: &str) -> Result<RemoteRelease, UpdaterError> {
        let href = find_download_link(html, &self.archive_extension).ok_or_else(|| {
            UpdaterError::DownloadLinkNotFound {
                url: self.url.clone(),
                extension: self.archive_extension.clone(),
            }
        })?;

        let download_url = resolve_download_url(&self.url, &href);
        let version = AddonVersion::from_link(&url_after_host(&download_url))
            .ok_or_else(|| UpdaterError::RemoteVersionNotFound {
                url: download_url.clone(),
            })?;

        info!("Latest version available: {version} ({download_url})");
        Ok(RemoteRelease {
            version,
            download_url,
        })
    }
}

/// Everything after the host: path, query and fragment.
///
/// The version is searched for here so digits in a host name never match.
fn url_after_host(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        return parsed[Position::BeforePath..].to_string();
    }
    match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]).to_string(),
        None => url.to_string(),
    }
}
