//! Core types shared by every stage of an update run.

pub mod error;

pub use error::{ErrorContext, ErrorKind, UpdaterError, error_chain, user_friendly_error};
