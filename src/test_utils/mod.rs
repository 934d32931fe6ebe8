//! Test utilities for the updater
//!
//! Helpers shared by unit tests and the integration suite: in-memory zip
//! archives, installed add-on trees, and download page bodies.
//!
//! # Example
//!
//! ```rust,no_run
//! use addon_updater::test_utils::{download_page, install_addon, zip_bytes};
//!
//! let root = std::env::temp_dir().join("wow");
//! install_addon(&root, "ElvUI", "11.02");
//! let html = download_page("/downloads/elvui-11.07.zip");
//! let archive = zip_bytes(&[("ElvUI/ElvUI_Mainline.toc", "## Version: 11.07\n")]);
//! ```

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use zip::write::SimpleFileOptions;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run silently.
///
/// ```bash
/// RUST_LOG=addon_updater=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Builds a zip archive in memory from `(name, content)` pairs.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in entries {
        writer.start_file(*name, options).expect("Failed to start zip entry");
        writer.write_all(content.as_bytes()).expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip archive").into_inner()
}

/// A release archive shaped like the real thing: the package directory with
/// its manifest plus an `_OptionsUI` companion.
pub fn addon_archive(package: &str, version: &str) -> Vec<u8> {
    let manifest = format!("{package}/{package}_Mainline.toc");
    let manifest_body = format!("## Interface: 110002\n## Title: {package}\n## Version: {version}\n");
    let core = format!("{package}/Core/init.lua");
    let options = format!("{package}_OptionsUI/options.lua");
    zip_bytes(&[
        (manifest.as_str(), manifest_body.as_str()),
        (core.as_str(), "-- core"),
        (options.as_str(), "-- options"),
    ])
}

/// The `AddOns` directory of a retail client under `root`.
pub fn addons_dir(root: &Path) -> PathBuf {
    root.join("_retail_").join("Interface").join("AddOns")
}

/// Installs a fake `version` of `package` under `root`, including a stale
/// file in each directory so replacement can be observed.
pub fn install_addon(root: &Path, package: &str, version: &str) {
    let addons = addons_dir(root);
    let package_dir = addons.join(package);
    let options_dir = addons.join(format!("{package}_OptionsUI"));
    std::fs::create_dir_all(&package_dir).expect("Failed to create package dir");
    std::fs::create_dir_all(&options_dir).expect("Failed to create options dir");

    std::fs::write(
        package_dir.join(format!("{package}_Mainline.toc")),
        format!("## Interface: 110002\n## Version: {version}\n"),
    )
    .expect("Failed to write manifest");
    std::fs::write(package_dir.join("stale.lua"), "-- old").expect("Failed to write stale file");
    std::fs::write(options_dir.join("stale.lua"), "-- old").expect("Failed to write stale file");
}

/// A download page whose only archive link is `href`.
pub fn download_page(href: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <body>
    <a href="/changelog.php?ui=elvui">Changelog</a>
    <div class="download">
      <a href="{href}" class="btn">Download</a>
    </div>
  </body>
</html>"#
    )
}
