//! Configuration for an update run
//!
//! Settings are resolved from three layers, highest precedence first:
//!
//! 1. **CLI flags** ([`ConfigOverrides`])
//! 2. **Config file** ([`FileConfig`], TOML, passed with `--config`)
//! 3. **Built-in defaults** ([`crate::constants`])
//!
//! The result is an immutable [`UpdaterConfig`] handed to
//! [`Updater::new`](crate::updater::Updater::new).
//!
//! # Config File
//!
//! ```toml
//! wow_path = "D:/World of Warcraft"
//! download_path = "D:/Downloads/elvui"
//! url = "https://www.tukui.org/download.php?ui=elvui"
//! package = "ElvUI"
//! client_dir = "_retail_"
//! companion_suffixes = ["_OptionsUI"]
//! log_file = "D:/logs/update_elvui.log"
//! log_level = "info"
//! timeout_secs = 30
//! lock_timeout_secs = 60
//! strict = false
//! ```

mod parser;

pub use parser::{load_file_config, parse_config};

use crate::constants::{
    DEFAULT_ARCHIVE_EXTENSION, DEFAULT_CLIENT_DIR, DEFAULT_COMPANION_SUFFIXES,
    DEFAULT_DOWNLOAD_PATH, DEFAULT_LOG_FILE, DEFAULT_PACKAGE, DEFAULT_PAGE_URL,
    default_http_timeout, default_lock_timeout,
};
use crate::core::UpdaterError;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Verbosity of the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only failures
    Error,
    /// Failures and warnings
    Warn,
    /// Operational messages (default)
    #[default]
    Info,
    /// Request and file-level detail
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// The directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings read from the optional TOML config file.
///
/// Every field is optional; missing fields fall through to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Game installation root
    pub wow_path: Option<PathBuf>,
    /// Directory where archives are cached
    pub download_path: Option<PathBuf>,
    /// Download page URL
    pub url: Option<String>,
    /// Add-on directory name
    pub package: Option<String>,
    /// Game client directory under the installation root
    pub client_dir: Option<String>,
    /// Suffixes of sibling directories replaced with the package
    pub companion_suffixes: Option<Vec<String>>,
    /// Substring identifying the archive link
    pub archive_extension: Option<String>,
    /// Log file path
    pub log_file: Option<PathBuf>,
    /// Log verbosity
    pub log_level: Option<LogLevel>,
    /// HTTP request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Lock wait timeout in seconds
    pub lock_timeout_secs: Option<u64>,
    /// Map install failures to a non-zero exit code
    pub strict: Option<bool>,
}

/// Settings given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--wow-path`
    pub wow_path: Option<PathBuf>,
    /// `--download-path`
    pub download_path: Option<PathBuf>,
    /// `--url`
    pub url: Option<String>,
    /// `--package`
    pub package: Option<String>,
    /// `--client-dir`
    pub client_dir: Option<String>,
    /// `--log-file`
    pub log_file: Option<PathBuf>,
    /// `--log-level`
    pub log_level: Option<LogLevel>,
    /// `--timeout`
    pub timeout_secs: Option<u64>,
    /// `--strict`; only ever switches strict mode on
    pub strict: bool,
}

/// Fully resolved, immutable settings for one run.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Game installation root
    pub wow_path: PathBuf,
    /// Directory where archives are cached
    pub download_path: PathBuf,
    /// Download page URL
    pub url: String,
    /// Add-on directory name (e.g. `ElvUI`)
    pub package: String,
    /// Game client directory under the installation root
    pub client_dir: String,
    /// Suffixes of sibling directories replaced with the package
    pub companion_suffixes: Vec<String>,
    /// Substring identifying the archive link
    pub archive_extension: String,
    /// Log file path
    pub log_file: PathBuf,
    /// Log verbosity
    pub log_level: LogLevel,
    /// Timeout applied to each HTTP request
    pub http_timeout: Duration,
    /// How long to wait for another run's lock
    pub lock_timeout: Duration,
    /// Map install failures to a non-zero exit code
    pub strict: bool,
}

impl UpdaterConfig {
    /// Creates a configuration with defaults for everything but the installation root.
    pub fn new(wow_path: impl Into<PathBuf>) -> Self {
        Self {
            wow_path: wow_path.into(),
            download_path: PathBuf::from(DEFAULT_DOWNLOAD_PATH),
            url: DEFAULT_PAGE_URL.to_string(),
            package: DEFAULT_PACKAGE.to_string(),
            client_dir: DEFAULT_CLIENT_DIR.to_string(),
            companion_suffixes: DEFAULT_COMPANION_SUFFIXES.iter().map(|s| (*s).to_string()).collect(),
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: LogLevel::default(),
            http_timeout: default_http_timeout(),
            lock_timeout: default_lock_timeout(),
            strict: false,
        }
    }

    /// Merges CLI flags over the file layer over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Config`] when no installation root is given in
    /// either layer, or when a resolved value is unusable.
    pub fn resolve(cli: ConfigOverrides, file: FileConfig) -> Result<Self, UpdaterError> {
        let wow_path = cli.wow_path.or(file.wow_path).ok_or_else(|| UpdaterError::Config {
            message: "no installation root given (use --wow-path or `wow_path` in the config file)"
                .to_string(),
        })?;

        let mut config = Self::new(wow_path);
        if let Some(path) = cli.download_path.or(file.download_path) {
            config.download_path = path;
        }
        if let Some(url) = cli.url.or(file.url) {
            config.url = url;
        }
        if let Some(package) = cli.package.or(file.package) {
            config.package = package;
        }
        if let Some(client_dir) = cli.client_dir.or(file.client_dir) {
            config.client_dir = client_dir;
        }
        if let Some(suffixes) = file.companion_suffixes {
            config.companion_suffixes = suffixes;
        }
        if let Some(extension) = file.archive_extension {
            config.archive_extension = extension;
        }
        if let Some(log_file) = cli.log_file.or(file.log_file) {
            config.log_file = log_file;
        }
        if let Some(level) = cli.log_level.or(file.log_level) {
            config.log_level = level;
        }
        if let Some(secs) = cli.timeout_secs.or(file.timeout_secs) {
            config.http_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.lock_timeout_secs {
            config.lock_timeout = Duration::from_secs(secs);
        }
        config.strict = cli.strict || file.strict.unwrap_or(false);

        config.validate()?;
        Ok(config)
    }

    /// Checks values that would otherwise fail late or in surprising ways.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), UpdaterError> {
        let invalid = |message: String| Err(UpdaterError::Config { message });

        if self.package.trim().is_empty() || self.package.contains(['/', '\\']) {
            return invalid(format!("package name '{}' must be a single directory name", self.package));
        }
        if self.archive_extension.is_empty() {
            return invalid("archive extension must not be empty".to_string());
        }
        if self.http_timeout.is_zero() {
            return invalid("HTTP timeout must be at least one second".to_string());
        }
        if url::Url::parse(&self.url).is_err() {
            return invalid(format!("'{}' is not an absolute URL", self.url));
        }
        Ok(())
    }

    /// Builder-style override of the download page URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder-style override of the archive storage path.
    #[must_use]
    pub fn with_download_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.download_path = path.into();
        self
    }

    /// Builder-style override of the HTTP timeout.
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Builder-style override of the lock timeout.
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

/// Removes every leading and trailing `"` or `'` character from a path argument.
///
/// Scheduled tasks on Windows often pass `"D:\World of Warcraft\"`, where the
/// trailing backslash escapes the closing quote and leaves it in the argument.
#[must_use]
pub fn strip_quotes(raw: &str) -> &str {
    raw.trim_matches(|c| c == '"' || c == '\'')
}
