//! Error types and the failure policy applied to them

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of a single log call.
///
/// All of these describe a broken environment (unwritable directory,
/// vanished file, unresolvable call site) rather than a transient condition,
/// so none of them are retried.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to create log file {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read metadata of log file {path}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to rotate log file {from} to {to}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to log file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not resolve the calling function from `{raw}`")]
    CallerUnresolved { raw: String },
}

impl LogError {
    /// The underlying IO error, if this failure came from the filesystem
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            LogError::Create { source, .. }
            | LogError::Open { source, .. }
            | LogError::Stat { source, .. }
            | LogError::Rename { source, .. }
            | LogError::Write { source, .. } => Some(source),
            LogError::CallerUnresolved { .. } => None,
        }
    }

    /// One-line diagnostic suitable for printing right before exiting
    pub fn diagnostic(&self) -> String {
        match self.io_error() {
            Some(e) => match categorize_io_error(e) {
                DiskErrorKind::Other => format!("{}: {}", self, e),
                kind => format!("{}: {}", self, kind.user_message()),
            },
            None => self.to_string(),
        }
    }
}

/// What a logger does when a log call fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Print a diagnostic and terminate the process with exit status 1
    #[default]
    Abort,
    /// Return the error to the caller of the log operation
    Propagate,
}

/// Categories of disk errors for user-friendly messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskErrorKind {
    /// Disk is full or quota exceeded
    DiskFull,
    /// Permission denied (read or write)
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// Other IO error
    Other,
}

impl DiskErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            DiskErrorKind::DiskFull => "disk full or quota exceeded",
            DiskErrorKind::PermissionDenied => "permission denied",
            DiskErrorKind::NotFound => "file or directory not found",
            DiskErrorKind::Other => "io error",
        }
    }
}

/// Categorize an IO error into a user-friendly category
pub fn categorize_io_error(e: &io::Error) -> DiskErrorKind {
    use std::io::ErrorKind;

    match e.kind() {
        ErrorKind::WriteZero => DiskErrorKind::DiskFull,
        ErrorKind::PermissionDenied => DiskErrorKind::PermissionDenied,
        ErrorKind::NotFound => DiskErrorKind::NotFound,
        _ => {
            #[cfg(unix)]
            {
                if let Some(os_error) = e.raw_os_error() {
                    // ENOSPC = 28; EDQUOT = 122 on Linux, 69 on macOS
                    if os_error == 28 || os_error == 122 || os_error == 69 {
                        return DiskErrorKind::DiskFull;
                    }
                    // EACCES
                    if os_error == 13 {
                        return DiskErrorKind::PermissionDenied;
                    }
                }
            }
            DiskErrorKind::Other
        }
    }
}
