//! Integration tests for the `addon-updater` binary.

use addon_updater::test_utils::{addon_archive, addons_dir, download_page, install_addon};
use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::process::Output;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARCHIVE_PATH: &str = "/downloads/elvui-11.07.zip";

struct TestProject {
    server: MockServer,
    wow: TempDir,
    downloads: TempDir,
}

impl TestProject {
    async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            wow: TempDir::new().unwrap(),
            downloads: TempDir::new().unwrap(),
        }
    }

    async fn serve_page(&self) {
        Mock::given(method("GET"))
            .and(path("/download.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string(download_page(ARCHIVE_PATH)))
            .mount(&self.server)
            .await;
    }

    async fn serve_archive(&self, status: u16, expected_hits: u64) {
        let response = if status == 200 {
            ResponseTemplate::new(200).set_body_bytes(addon_archive("ElvUI", "11.07"))
        } else {
            ResponseTemplate::new(status)
        };
        Mock::given(method("GET"))
            .and(path(ARCHIVE_PATH))
            .respond_with(response)
            .expect(expected_hits)
            .mount(&self.server)
            .await;
    }

    fn log_file(&self) -> std::path::PathBuf {
        self.downloads.path().join("update_elvui.log")
    }

    /// Base command: install root, download path, page URL, and log file
    /// pointing into the fixture.
    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("addon-updater").unwrap();
        cmd.current_dir(self.downloads.path())
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg("--wow-path")
            .arg(self.wow.path())
            .arg("--download-path")
            .arg(self.downloads.path())
            .arg("--url")
            .arg(format!("{}/download.php?ui=elvui", self.server.uri()))
            .arg("--log-file")
            .arg(self.log_file())
            .arg("--timeout")
            .arg("5");
        cmd
    }

    fn manifest(&self) -> String {
        std::fs::read_to_string(addons_dir(self.wow.path()).join("ElvUI").join("ElvUI_Mainline.toc"))
            .unwrap()
    }

    fn log(&self) -> String {
        std::fs::read_to_string(self.log_file()).unwrap()
    }
}

/// Runs the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap()).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_updates_outdated_install() {
    let project = TestProject::new().await;
    install_addon(project.wow.path(), "ElvUI", "11.02");
    project.serve_page().await;
    project.serve_archive(200, 1).await;

    run(project.command()).await.assert().success().stdout(predicate::str::is_empty());

    assert!(project.manifest().contains("Version: 11.07"));
    assert!(project.downloads.path().join("elvui-11.07.zip").is_file());

    let log = project.log();
    assert!(log.contains("Currently installed ElvUI version: 11.02"));
    assert!(log.contains("Downloading latest version: 11.07..."));
    assert!(log.contains("Done!"));
    assert!(log.contains("INFO"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_up_to_date_run_logs_and_exits_zero() {
    let project = TestProject::new().await;
    install_addon(project.wow.path(), "ElvUI", "11.07");
    project.serve_page().await;
    project.serve_archive(200, 0).await;

    run(project.command()).await.assert().success();

    assert!(project.log().contains("Already at latest version: 11.07."));
    assert!(addons_dir(project.wow.path()).join("ElvUI").join("stale.lua").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_log_file_is_appended() {
    let project = TestProject::new().await;
    install_addon(project.wow.path(), "ElvUI", "11.07");
    project.serve_page().await;

    run(project.command()).await.assert().success();
    run(project.command()).await.assert().success();

    assert_eq!(project.log().matches("Already at latest version").count(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_prints_status() {
    let project = TestProject::new().await;
    install_addon(project.wow.path(), "ElvUI", "11.02");
    project.serve_page().await;
    project.serve_archive(200, 0).await;

    let mut cmd = project.command();
    cmd.arg("--check");

    run(cmd)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("11.02"))
        .stdout(predicate::str::contains("11.07"))
        .stdout(predicate::str::contains("Update available"));

    assert!(project.manifest().contains("Version: 11.02"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_install_exits_zero_by_default() {
    let project = TestProject::new().await;
    install_addon(project.wow.path(), "ElvUI", "11.02");
    project.serve_page().await;
    project.serve_archive(500, 1).await;

    run(project.command()).await.assert().success();

    let log = project.log();
    assert!(log.contains("ERROR"));
    assert!(log.contains("500"));
    assert!(project.manifest().contains("Version: 11.02"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_install_with_strict() {
    let project = TestProject::new().await;
    install_addon(project.wow.path(), "ElvUI", "11.02");
    project.serve_page().await;
    project.serve_archive(500, 1).await;

    let mut cmd = project.command();
    cmd.arg("--strict");

    // Network failures map to exit code 4.
    run(cmd).await.assert().code(4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_page_fails_construction() {
    let project = TestProject::new().await;
    Mock::given(method("GET"))
        .and(path("/download.php"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&project.server)
        .await;

    run(project.command()).await.assert().failure().code(4);
    assert!(project.log().contains("404"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_install_root() {
    let project = TestProject::new().await;
    let mut cmd = Command::cargo_bin("addon-updater").unwrap();
    cmd.current_dir(project.downloads.path())
        .arg("-w")
        .arg(project.wow.path().join("missing"))
        .arg("--log-file")
        .arg(project.log_file());

    run(cmd).await.assert().code(2);
    assert!(project.log().contains("installation root"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quoted_paths_are_accepted() {
    let project = TestProject::new().await;
    install_addon(project.wow.path(), "ElvUI", "11.07");
    project.serve_page().await;

    let mut cmd = Command::cargo_bin("addon-updater").unwrap();
    cmd.current_dir(project.downloads.path())
        .arg("-w")
        .arg(format!("\"{}\"", project.wow.path().display()))
        .arg("-e")
        .arg(format!("'{}'", project.downloads.path().display()))
        .arg("--url")
        .arg(format!("{}/download.php?ui=elvui", project.server.uri()));

    run(cmd).await.assert().success();
    // Default log file lands in the working directory.
    assert!(project.log().contains("Already at latest version: 11.07."));
}

#[test]
fn test_no_install_root_is_a_usage_error() {
    let temp = TempDir::new().unwrap();
    Command::cargo_bin("addon-updater")
        .unwrap()
        .current_dir(temp.path())
        .env("NO_COLOR", "1")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no installation root given"));
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("updater.toml");
    std::fs::write(&config, "wowpath = \"/games/wow\"\n").unwrap();

    Command::cargo_bin("addon-updater")
        .unwrap()
        .current_dir(temp.path())
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown field"));
}
