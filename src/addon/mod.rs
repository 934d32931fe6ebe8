//! On-disk layout of an installed add-on.
//!
//! ```text
//! <install_root>/
//! └── _retail_/Interface/AddOns/          <- extraction target
//!     ├── ElvUI/                          <- package directory (replaced)
//!     │   └── ElvUI_Mainline.toc          <- manifest with `Version: NN.NN`
//!     └── ElvUI_OptionsUI/                <- companion directory (replaced)
//! ```

pub mod manifest;

pub use manifest::installed_version;

use crate::config::UpdaterConfig;
use crate::version::AddonVersion;
use std::path::PathBuf;

/// Resolves every path the updater touches under the installation root.
#[derive(Debug, Clone)]
pub struct AddonLayout {
    install_root: PathBuf,
    client_dir: String,
    package: String,
    companion_suffixes: Vec<String>,
}

impl AddonLayout {
    /// Layout for `package` installed under `install_root/client_dir`.
    pub fn new(
        install_root: impl Into<PathBuf>,
        client_dir: impl Into<String>,
        package: impl Into<String>,
    ) -> Self {
        Self {
            install_root: install_root.into(),
            client_dir: client_dir.into(),
            package: package.into(),
            companion_suffixes: Vec::new(),
        }
    }

    /// Layout described by a resolved configuration.
    pub fn from_config(config: &UpdaterConfig) -> Self {
        Self::new(&config.wow_path, &config.client_dir, &config.package)
            .with_companion_suffixes(config.companion_suffixes.clone())
    }

    /// Sets the suffixes of sibling directories that belong to the package.
    #[must_use]
    pub fn with_companion_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.companion_suffixes = suffixes;
        self
    }

    /// The package name, e.g. `ElvUI`.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// `Interface/AddOns` of the configured client; archives extract here.
    pub fn addons_dir(&self) -> PathBuf {
        self.install_root.join(&self.client_dir).join("Interface").join("AddOns")
    }

    /// The package's own directory.
    pub fn package_dir(&self) -> PathBuf {
        self.addons_dir().join(&self.package)
    }

    /// The `<Package>_Mainline.toc` manifest inside the package directory.
    pub fn manifest_path(&self) -> PathBuf {
        self.package_dir().join(format!("{}_Mainline.toc", self.package))
    }

    /// Every directory removed before a new version is extracted.
    ///
    /// The package directory comes first, followed by one directory per
    /// companion suffix.
    pub fn install_dirs(&self) -> Vec<PathBuf> {
        let addons = self.addons_dir();
        std::iter::once(self.package_dir())
            .chain(
                self.companion_suffixes
                    .iter()
                    .map(|suffix| addons.join(format!("{}{suffix}", self.package))),
            )
            .collect()
    }

    /// Cache file name for a version, e.g. `elvui-11.07.zip`.
    pub fn archive_file_name(&self, version: &AddonVersion) -> String {
        format!("{}-{version}.zip", self.package.to_lowercase())
    }
}
