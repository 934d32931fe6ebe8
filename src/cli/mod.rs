//! Command-line interface for the add-on updater.
//!
//! The binary is meant to be run unattended (cron, Task Scheduler, a login
//! script). A normal run prints nothing: every operational message and every
//! caught error goes to the log file.
//!
//! # Usage
//!
//! ```bash
//! # Update ElvUI under a retail install, caching archives next to the binary
//! addon-updater -w "/games/World of Warcraft"
//!
//! # Keep archives elsewhere and fail loudly for a supervisor
//! addon-updater -w "/games/World of Warcraft" -e ~/addon-cache --strict
//!
//! # Just report what would happen
//! addon-updater -w "/games/World of Warcraft" --check
//!
//! # Everything from a file, with one override
//! addon-updater --config updater.toml --log-level debug
//! ```
//!
//! # Exit codes
//!
//! | Situation | Code |
//! |---|---|
//! | up to date, installed, or `--check` | 0 |
//! | install failed, default mode | 0 (failure is logged) |
//! | install failed with `--strict` | [`ErrorKind::exit_code`] |
//! | versions could not be resolved | [`ErrorKind::exit_code`] |
//! | bad arguments or config file | 2 |
//! | log file cannot be opened | 1 |
//!
//! [`ErrorKind::exit_code`]: crate::core::ErrorKind::exit_code

use crate::config::{
    ConfigOverrides, LogLevel, UpdaterConfig, load_file_config, strip_quotes,
};
use crate::core::UpdaterError;
use crate::updater::{InstallOutcome, Updater};
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

/// Main CLI application structure for the updater.
#[derive(Parser, Debug)]
#[command(
    name = "addon-updater",
    about = "Keep a World of Warcraft add-on up to date from its download page",
    version,
    long_about = "Compares the installed add-on version with the newest archive offered by the \
                  download page, downloads it if needed, and replaces the installed directories."
)]
pub struct Cli {
    /// World of Warcraft installation root.
    ///
    /// The directory that contains `_retail_`. Surrounding `"` or `'`
    /// characters are stripped, so paths pasted with quotes still work.
    /// Required unless the config file sets `wow_path`.
    #[arg(short = 'w', long = "wow-path", value_name = "PATH")]
    wow_path: Option<String>,

    /// Directory where downloaded archives are kept.
    ///
    /// An archive already present here is reused instead of downloaded
    /// again. Defaults to the current directory.
    #[arg(short = 'e', long = "download-path", value_name = "PATH")]
    download_path: Option<String>,

    /// Download page to scrape for the latest archive.
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Add-on package name (directory and manifest prefix).
    #[arg(long, value_name = "NAME")]
    package: Option<String>,

    /// Game client directory under the installation root.
    #[arg(long, value_name = "DIR")]
    client_dir: Option<String>,

    /// Log file to append to.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Minimum level written to the log file. `RUST_LOG` wins when set.
    #[arg(long, value_enum, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// HTTP timeout in seconds for the page and archive requests.
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// TOML file with default settings; flags override it.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Exit non-zero when the install fails.
    ///
    /// Without it a failed install is logged and the process still exits 0.
    #[arg(long)]
    strict: bool,

    /// Print installed and latest versions without installing.
    #[arg(long, conflicts_with = "force")]
    check: bool,

    /// Reinstall even when the installed version is the latest.
    #[arg(short, long)]
    force: bool,

    /// Mirror log events to stderr.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Whether log events should also go to stderr.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Command-line values that take precedence over the config file.
    ///
    /// Path arguments have surrounding quotes stripped.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            wow_path: self.wow_path.as_deref().map(|p| PathBuf::from(strip_quotes(p))),
            download_path: self.download_path.as_deref().map(|p| PathBuf::from(strip_quotes(p))),
            url: self.url.clone(),
            package: self.package.clone(),
            client_dir: self.client_dir.clone(),
            log_file: self.log_file.clone(),
            log_level: self.log_level,
            timeout_secs: self.timeout,
            strict: self.strict,
        }
    }

    /// Merges the flags over the `--config` file (if any) and built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if the
    /// merged settings are invalid (for example no installation root).
    pub fn load_config(&self) -> Result<UpdaterConfig> {
        let file = load_file_config(self.config.as_deref())?;
        Ok(UpdaterConfig::resolve(self.overrides(), file)?)
    }

    /// Runs the updater and returns the process exit code.
    ///
    /// Failures have already been logged by the [`Updater`] by the time this
    /// returns; only the exit code is decided here.
    pub async fn execute(&self, config: UpdaterConfig) -> i32 {
        let strict = config.strict;
        let mut updater = match Updater::new(config).await {
            Ok(updater) => updater,
            Err(e) => return e.kind().exit_code(),
        };

        if self.check {
            print_status(&updater);
            return 0;
        }

        install_exit_code(&updater.install_with(self.force).await, strict)
    }
}

/// Maps an install result to an exit code.
///
/// Failures only produce a non-zero code in strict mode.
pub fn install_exit_code(result: &Result<InstallOutcome, UpdaterError>, strict: bool) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) if strict => e.kind().exit_code(),
        Err(_) => 0,
    }
}

fn print_status(updater: &Updater) {
    let package = updater.layout().package();
    let installed = updater.installed_version();
    let latest = updater.latest_version();

    if installed.is_installed() {
        println!("{package} installed: {}", installed.to_string().cyan());
    } else {
        println!("{package} installed: {}", "not installed".yellow());
    }
    println!("{package} latest:    {}", latest.to_string().cyan());

    if updater.is_up_to_date() {
        println!("{}", "Up to date".green().bold());
    } else {
        println!("{} ({})", "Update available".yellow().bold(), updater.download_url());
    }
}
