//! Error types shared across MockReel crates.

use std::path::PathBuf;

/// Top-level error type for MockReel operations.
#[derive(Debug, thiserror::Error)]
pub enum MockreelError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Recorder error: {message}")]
    Recorder { message: String },

    #[error("Scene error: {message}")]
    Scene { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MockreelError.
pub type MockreelResult<T> = Result<T, MockreelError>;

impl MockreelError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn recorder(msg: impl Into<String>) -> Self {
        Self::Recorder {
            message: msg.into(),
        }
    }

    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error came from the user or platform refusing capture,
    /// as opposed to a fault while capturing.
    pub fn is_capability_failure(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied { .. } | Self::Unsupported { .. }
        )
    }
}
