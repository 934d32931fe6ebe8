//! Library-level install workflows.

use addon_updater::config::{ConfigOverrides, UpdaterConfig, load_file_config};
use addon_updater::test_utils::{addon_archive, addons_dir, download_page, install_addon};
use addon_updater::updater::{InstallOutcome, Updater};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, package: &str, version: &str, archive_hits: u64) -> String {
    let archive_path = format!("/downloads/{}-{version}.zip", package.to_lowercase());
    Mock::given(method("GET"))
        .and(path("/download.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(download_page(&archive_path)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(archive_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(addon_archive(package, version)))
        .expect(archive_hits)
        .mount(server)
        .await;
    format!("{}/download.php?ui={}", server.uri(), package.to_lowercase())
}

fn toml_path(path: &Path) -> String {
    format!("{:?}", path.display().to_string())
}

#[tokio::test]
async fn test_install_from_config_file() {
    let server = MockServer::start().await;
    let url = serve(&server, "Tukui", "11.07", 1).await;

    let wow = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    install_addon(wow.path(), "Tukui", "11.02");

    let config_path = downloads.path().join("updater.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
wow_path = {}
download_path = {}
url = "{url}"
package = "Tukui"
companion_suffixes = []
timeout_secs = 5
lock_timeout_secs = 5
"#,
            toml_path(wow.path()),
            toml_path(downloads.path()),
        ),
    )
    .unwrap();

    let file = load_file_config(Some(config_path.as_path())).unwrap();
    let config = UpdaterConfig::resolve(ConfigOverrides::default(), file).unwrap();
    assert_eq!(config.http_timeout, Duration::from_secs(5));

    let mut updater = Updater::new(config).await.unwrap();
    let outcome = updater.install().await.unwrap();
    assert!(matches!(outcome, InstallOutcome::Installed { downloaded: true, .. }));

    let addons = addons_dir(wow.path());
    let manifest = std::fs::read_to_string(addons.join("Tukui").join("Tukui_Mainline.toc")).unwrap();
    assert!(manifest.contains("Version: 11.07"));
    assert!(!addons.join("Tukui").join("stale.lua").exists());
    // No companion suffixes configured, so the options directory was not cleared first.
    assert!(addons.join("Tukui_OptionsUI").join("stale.lua").exists());
    assert!(downloads.path().join("tukui-11.07.zip").is_file());
}

#[tokio::test]
async fn test_overlapping_runs_download_once() {
    let server = MockServer::start().await;
    let url = serve(&server, "ElvUI", "11.07", 1).await;

    let wow = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    install_addon(wow.path(), "ElvUI", "11.02");

    let config = UpdaterConfig::new(wow.path())
        .with_url(url)
        .with_download_path(downloads.path())
        .with_http_timeout(Duration::from_secs(5))
        .with_lock_timeout(Duration::from_secs(10));

    let mut first = Updater::new(config.clone()).await.unwrap();
    let mut second = Updater::new(config).await.unwrap();
    assert!(!first.is_up_to_date());
    assert!(!second.is_up_to_date());

    let (a, b) = tokio::join!(first.install(), second.install());
    let outcomes = [a.unwrap(), b.unwrap()];

    let installed = outcomes
        .iter()
        .filter(|o| matches!(o, InstallOutcome::Installed { .. }))
        .count();
    let up_to_date = outcomes
        .iter()
        .filter(|o| matches!(o, InstallOutcome::UpToDate { .. }))
        .count();
    assert_eq!((installed, up_to_date), (1, 1));
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let server = MockServer::start().await;
    let url = serve(&server, "ElvUI", "11.07", 1).await;

    let wow = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();
    let config = UpdaterConfig::new(wow.path())
        .with_url(url)
        .with_download_path(downloads.path())
        .with_http_timeout(Duration::from_secs(5));

    let mut updater = Updater::new(config.clone()).await.unwrap();
    assert!(!updater.installed_version().is_installed());
    updater.install().await.unwrap();

    let mut again = Updater::new(config).await.unwrap();
    assert_eq!(again.installed_version().as_str(), "11.07");
    let outcome = again.install().await.unwrap();
    assert!(matches!(outcome, InstallOutcome::UpToDate { .. }));
}
