//! Unified error types for the minibox workspace.
//!
//! Every failure is fatal at the site that observes it; the variants below
//! carry enough context to render a single `operation: reason` line.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum MiniboxError {
    /// The launch request is invalid or incomplete.
    #[error("invalid launch request: {message}")]
    Request {
        /// Description of the invalid request.
        message: String,
    },

    /// A syscall failed.
    #[error("{op}: {source}")]
    Syscall {
        /// Operation that failed, named after the syscall and its arguments.
        op: &'static str,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// A filesystem operation failed.
    #[error("{path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An external networking command failed.
    #[error("{command}: {detail}")]
    Command {
        /// The command line that failed.
        command: String,
        /// Exit status or spawn failure description.
        detail: String,
    },

    /// The final process-image replacement failed.
    #[error("execv {program}: {source}")]
    Exec {
        /// Program whose execution was attempted.
        program: String,
        /// Underlying OS error.
        source: std::io::Error,
    },

    /// The container was released with a failure verdict, or the start
    /// channel closed before a verdict arrived.
    #[error("{reason}")]
    Aborted {
        /// What went wrong on the other side of the channel.
        reason: &'static str,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, MiniboxError>;
