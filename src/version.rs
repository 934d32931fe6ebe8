//! Add-on version identifiers.
//!
//! Add-on versions are two zero-padded numeric components (`11.02`). The
//! updater only ever asks whether two versions are the same, so
//! [`AddonVersion`] keeps the original text and compares it verbatim. It has
//! no ordering.

use crate::constants::NOT_INSTALLED_VERSION;
use regex::Regex;
use std::fmt;

/// Matches the version declaration inside a `.toc` manifest.
const MANIFEST_VERSION_PATTERN: &str = r"Version: (\d{2}\.\d{2})";

/// Matches a version embedded in an archive link or file name.
const LINK_VERSION_PATTERN: &str = r"(\d{2}\.\d{2})";

/// A two-component add-on version such as `11.07`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddonVersion(String);

impl AddonVersion {
    /// The sentinel used when no manifest is installed.
    #[must_use]
    pub fn not_installed() -> Self {
        Self(NOT_INSTALLED_VERSION.to_string())
    }

    /// Returns `false` for the [`not_installed`](Self::not_installed) sentinel.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.0 != NOT_INSTALLED_VERSION
    }

    /// The version text, e.g. `"11.07"`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts the version from the contents of a `.toc` manifest.
    ///
    /// Looks for the first `Version: NN.NN` declaration and returns the
    /// captured `NN.NN`. Returns `None` if no declaration matches.
    ///
    /// ```
    /// use addon_updater::version::AddonVersion;
    ///
    /// let toc = "## Title: ElvUI\n## Version: 11.02\n";
    /// let version = AddonVersion::from_manifest(toc).unwrap();
    /// assert_eq!(version.as_str(), "11.02");
    /// ```
    #[must_use]
    pub fn from_manifest(content: &str) -> Option<Self> {
        let re = Regex::new(MANIFEST_VERSION_PATTERN).ok()?;
        let captures = re.captures(content)?;
        Some(Self(captures.get(1)?.as_str().to_string()))
    }

    /// Extracts the first `NN.NN` occurrence from an archive link or file name.
    ///
    /// ```
    /// use addon_updater::version::AddonVersion;
    ///
    /// let version = AddonVersion::from_link("elvui-11.07.zip").unwrap();
    /// assert_eq!(version.as_str(), "11.07");
    /// ```
    #[must_use]
    pub fn from_link(link: &str) -> Option<Self> {
        let re = Regex::new(LINK_VERSION_PATTERN).ok()?;
        re.find(link).map(|m| Self(m.as_str().to_string()))
    }
}

impl fmt::Display for AddonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
