//! Custom error types for the application.
//!
//! Provides structured error handling with meaningful error messages
//! and proper error categorization for each domain:
//!
//! - [`StorageError`] - Device enumeration and directory listing
//! - [`ThumbnailError`] - Preview acquisition (never shown to the user)
//! - [`PlaybackError`] - Media engine failures
//! - [`ViewError`] - Image viewer rejections
//! - [`StoreError`] - localStorage persistence

use std::fmt;

use thiserror::Error;

/// Storage enumeration and listing errors.
///
/// The `Display` text is the inline status message shown in the file list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Platform filesystem API not available
    #[error("Storage access not available")]
    Unavailable,
    /// No removable device is attached
    #[error("No USB found")]
    NoDevices,
    /// Path could not be resolved
    #[error("Cannot open path")]
    CannotOpen(String),
    /// Directory resolved but its children could not be listed
    #[error("Cannot read folder")]
    CannotRead(String),
}

/// Thumbnail acquisition errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThumbnailError {
    #[error("frame decode failed: {0}")]
    DecodeFailed(String),
    #[error("frame decode timed out")]
    TimedOut,
    #[error("no indexed preview")]
    NotIndexed,
    #[error("content index unavailable: {0}")]
    IndexUnavailable(String),
}

/// Classified engine error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    FileNotFound,
    UnsupportedFormat,
    SeekFailed,
    ConnectionFailed,
    Generic,
}

impl EngineErrorKind {
    /// Map a structured engine error code onto a kind.
    pub fn from_code(code: &str) -> Self {
        match code {
            "PLAYER_ERROR_NO_SUCH_FILE" | "PLAYER_ERROR_INVALID_URI" => Self::FileNotFound,
            "PLAYER_ERROR_NOT_SUPPORTED_FILE" | "PLAYER_ERROR_NOT_SUPPORTED_FORMAT" => {
                Self::UnsupportedFormat
            }
            "PLAYER_ERROR_SEEK_FAILED" => Self::SeekFailed,
            "PLAYER_ERROR_CONNECTION_FAILED" => Self::ConnectionFailed,
            _ => Self::Generic,
        }
    }
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound => write!(f, "File not found or cannot be accessed"),
            Self::UnsupportedFormat => write!(f, "Video format not supported"),
            Self::SeekFailed => write!(f, "Seek operation failed"),
            Self::ConnectionFailed => write!(f, "Connection failed"),
            Self::Generic => write!(f, "Playback error"),
        }
    }
}

/// Playback engine errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Engine rejected the open/prepare sequence
    #[error("Failed to prepare video: {0}")]
    PrepareFailed(String),
    /// Structured error reported while playing
    #[error("{kind} ({code})")]
    Engine { kind: EngineErrorKind, code: String },
    /// Command issued before the engine reported readiness
    #[error("Player is not ready")]
    NotReady,
    /// No engine could be initialized on this device
    #[error("Cannot initialize player: {0}")]
    Unavailable(String),
}

/// Image viewer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("{0} images are not supported by this TV")]
    FormatUnsupported(String),
    #[error("Cannot open this image")]
    DecodeFailed,
}

/// Key-value persistence errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// localStorage not available.
    #[error("localStorage not available")]
    Unavailable,
    /// Failed to write to localStorage.
    #[error("failed to save to localStorage")]
    SaveFailed,
    /// Value could not be serialized.
    #[error("failed to serialize value: {0}")]
    Serialize(String),
}
