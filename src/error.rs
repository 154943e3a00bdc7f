//! Typed failures for the core operations.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZimanError {
    #[error("configuration file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("permission denied: {}", path.display())]
    AccessDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("service supervisor unavailable: {0}")]
    SupervisorUnavailable(String),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("selection {index} is out of range (1-{len})")]
    OutOfRange { index: usize, len: usize },

    #[error("password '{value}' is no longer in the configuration; list again and retry")]
    StaleSelection { value: String },

    #[error("network inspection failed: {0}")]
    Inspection(String),
}

/// Reasons a candidate password is rejected before anything is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("password cannot be empty")]
    Empty,

    #[error("password '{0}' already exists")]
    Duplicate(String),

    #[error("password is {len} characters, below the minimum of {min}")]
    TooShort { len: usize, min: usize },
}

impl ZimanError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(action: &'static str, path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Self::AccessDenied {
                path: path.to_path_buf(),
                source,
            },
            _ => Self::Io {
                action,
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Whether the failure came from operator input rather than the host.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::OutOfRange { .. } | Self::StaleSelection { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ZimanError>;
