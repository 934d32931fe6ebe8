//! Error handling for the add-on updater
//!
//! Two types cooperate here:
//! - [`UpdaterError`] - the strongly-typed failure returned by every fallible
//!   operation in the crate
//! - [`ErrorContext`] - a wrapper with a suggestion and details, used by the
//!   binary for the few failures that happen before the log file is open
//!
//! # Error Categories
//!
//! Every variant belongs to exactly one [`ErrorKind`]:
//! - **Configuration**: [`UpdaterError::PathNotFound`], [`UpdaterError::Config`]
//! - **Scrape**: [`UpdaterError::ManifestVersionNotFound`],
//!   [`UpdaterError::DownloadLinkNotFound`], [`UpdaterError::RemoteVersionNotFound`]
//! - **Network**: [`UpdaterError::Network`], [`UpdaterError::Timeout`]
//! - **Filesystem**: [`UpdaterError::Filesystem`], [`UpdaterError::Archive`],
//!   [`UpdaterError::LockTimeout`]
//!
//! The kind decides the process exit code in strict mode.
//!
//! # Logging Errors
//!
//! Errors are logged on one line together with their whole cause chain:
//!
//! ```rust,no_run
//! use addon_updater::core::{UpdaterError, error_chain};
//! use std::path::PathBuf;
//!
//! let err = UpdaterError::PathNotFound {
//!     what: "installation root",
//!     path: PathBuf::from("/games/wow"),
//! };
//! tracing::error!(error = %error_chain(&err), "Update failed");
//! ```

use colored::Colorize;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The main error type for updater operations
#[derive(Error, Debug)]
pub enum UpdaterError {
    /// A configured path does not exist
    ///
    /// Raised while constructing the updater, before any network call.
    #[error("The {what} does not exist: {}", path.display())]
    PathNotFound {
        /// Which setting the path came from (e.g. "installation root")
        what: &'static str,
        /// The missing path
        path: PathBuf,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// The manifest exists but has no `Version: NN.NN` declaration
    #[error("No `Version: NN.NN` declaration in manifest {}", path.display())]
    ManifestVersionNotFound {
        /// Path of the manifest that was read
        path: PathBuf,
    },

    /// The download page has no anchor pointing at an archive
    #[error("No link containing '{extension}' found on {url}")]
    DownloadLinkNotFound {
        /// The page that was scraped
        url: String,
        /// The archive extension that was searched for
        extension: String,
    },

    /// The scraped download link does not carry a version number
    #[error("No version number found in download link {url}")]
    RemoteVersionNotFound {
        /// The resolved download URL
        url: String,
    },

    /// An HTTP request did not finish within the configured timeout
    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout {
        /// The requested URL
        url: String,
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// An HTTP request failed in transport or returned an error status
    #[error("Request to {url} failed")]
    Network {
        /// The requested URL
        url: String,
        /// The underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// A filesystem operation failed
    #[error("Failed to {operation} {}", path.display())]
    Filesystem {
        /// The operation that failed (e.g. "remove directory")
        operation: &'static str,
        /// The path being operated on
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The downloaded archive could not be read or extracted
    #[error("Failed to extract archive {}", path.display())]
    Archive {
        /// The archive on disk
        path: PathBuf,
        /// The underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// Another run held the update lock for longer than the lock timeout
    #[error("Timeout acquiring update lock {} after {timeout:?}", path.display())]
    LockTimeout {
        /// The lock file
        path: PathBuf,
        /// How long this run waited
        timeout: Duration,
    },
}

/// Broad classification of an [`UpdaterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad paths or settings
    Configuration,
    /// A version or link could not be extracted
    Scrape,
    /// Transport failure, error status, or timeout
    Network,
    /// Local disk, archive, or lock failure
    Filesystem,
}

impl ErrorKind {
    /// Process exit code used for this kind when running in strict mode.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Configuration => 2,
            Self::Scrape => 3,
            Self::Network => 4,
            Self::Filesystem => 5,
        }
    }
}

impl UpdaterError {
    /// Returns the taxonomy bucket for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PathNotFound { .. } | Self::Config { .. } => ErrorKind::Configuration,
            Self::ManifestVersionNotFound { .. }
            | Self::DownloadLinkNotFound { .. }
            | Self::RemoteVersionNotFound { .. } => ErrorKind::Scrape,
            Self::Timeout { .. } | Self::Network { .. } => ErrorKind::Network,
            Self::Filesystem { .. } | Self::Archive { .. } | Self::LockTimeout { .. } => {
                ErrorKind::Filesystem
            }
        }
    }

    /// Builds an [`UpdaterError`] from a client error, separating timeouts.
    pub fn from_request(url: &str, timeout: Duration, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source,
            }
        }
    }

    /// Wraps an I/O error with the operation and path it came from.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Renders an error followed by each of its sources, separated by `: `.
///
/// This is the single-line "full trace" written to the log file.
#[must_use]
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Error with user-facing suggestion and details
///
/// Only used for failures the binary has to report on stderr because the log
/// file is not available yet (unreadable config file, unwritable log path).
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error, already rendered with its cause chain
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any startup error to an [`ErrorContext`] with a suggestion
///
/// Recognizes [`UpdaterError`] configuration failures and TOML syntax errors;
/// everything else is shown with its cause chain and no suggestion.
pub fn user_friendly_error(error: &anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    if let Some(updater_error) = error.downcast_ref::<UpdaterError>() {
        return match updater_error {
            UpdaterError::PathNotFound { what, .. } => ErrorContext::new(message)
                .with_suggestion(format!("Check the {what} argument; surrounding quotes are stripped"))
                .with_details("Both the installation root and the download path must already exist"),
            UpdaterError::Config { .. } => ErrorContext::new(message)
                .with_suggestion("Run with --help to see the accepted values"),
            _ => ErrorContext::new(message),
        };
    }

    if error.downcast_ref::<toml::de::Error>().is_some() {
        return ErrorContext::new(message)
            .with_suggestion("Check the TOML syntax in the config file")
            .with_details("Unknown keys are rejected; see the README for the accepted settings");
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(message)
                .with_suggestion("Choose a log file location you can write to with --log-file");
        }
    }

    ErrorContext::new(message)
}
