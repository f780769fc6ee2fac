//! Error types for listing and root enumeration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while listing a directory.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// The OS refused to list the directory.
    #[error("Access denied: {path}")]
    AccessDenied { path: PathBuf },

    /// Any other OS-level failure (device removed, path too long, I/O error).
    #[error("Failed to list {path}: {source}")]
    Enumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker running the listing died before reporting back.
    #[error("Listing worker failed: {message}")]
    Worker { message: String },
}

impl ExpandError {
    /// Create a listing error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied { path },
            _ => Self::Enumeration { path, source },
        }
    }

    /// Create a worker failure.
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    /// Check if this is a permission failure.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    /// Short description without the path, as shown inline in the tree.
    pub fn reason(&self) -> String {
        match self {
            Self::AccessDenied { .. } => "access denied".to_string(),
            Self::Enumeration { source, .. } => source.to_string(),
            Self::Worker { message } => message.clone(),
        }
    }
}

/// Kind of browse warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A volume was listed but could not be described.
    VolumeUnavailable,
    /// The volume list itself could not be read.
    VolumeListing,
}

/// Non-fatal problem that is logged and kept, never shown as a tree entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseWarning {
    /// Path the warning concerns, empty when there is none.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl BrowseWarning {
    /// Create a new browse warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for a volume that could not be described.
    pub fn volume_unavailable(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("Skipping volume {}: {error}", path.display()),
            path,
            kind: WarningKind::VolumeUnavailable,
        }
    }

    /// Create a warning for a failed volume enumeration.
    pub fn volume_listing(error: &std::io::Error) -> Self {
        Self {
            path: PathBuf::new(),
            message: format!("Failed to enumerate volumes: {error}"),
            kind: WarningKind::VolumeListing,
        }
    }
}
