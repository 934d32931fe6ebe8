//! addon-updater entry point
//!
//! Parses arguments, resolves the configuration, opens the log file, and runs
//! one update. Errors that happen before the log file exists are printed to
//! stderr; everything after that goes to the log.

use addon_updater::cli::Cli;
use addon_updater::core::user_friendly_error;
use addon_updater::logging;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            user_friendly_error(&e).display();
            std::process::exit(2);
        }
    };

    let guard = match logging::init_logging(&config.log_file, config.log_level, cli.verbose()) {
        Ok(guard) => guard,
        Err(e) => {
            let e = anyhow::Error::new(e)
                .context(format!("Failed to open log file: {}", config.log_file.display()));
            user_friendly_error(&e).display();
            std::process::exit(1);
        }
    };

    let code = cli.execute(config).await;

    // process::exit skips destructors; flush the log first.
    drop(guard);
    std::process::exit(code);
}
