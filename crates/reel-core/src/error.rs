/// Core error types for reel generation.
use serde::Serialize;
use std::fmt;

/// A specialized Result type for reel operations.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error type encompassing every reel subsystem.
#[derive(Debug, thiserror::Error)]
pub enum ReelError {
    #[error("asset error: {message} ({source_name})")]
    AssetLoad {
        message: String,
        source_name: String,
    },

    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("drawing surface is already used by an active session")]
    SurfaceBusy,

    #[error("unsupported video format: {0}")]
    UnsupportedFormat(String),

    #[error("encode error: {0}")]
    Encoding(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReelError {
    /// Create an asset error for the named source (a path, URL or `<memory>`).
    pub fn asset(message: impl Into<String>, source_name: impl Into<String>) -> Self {
        ReelError::AssetLoad {
            message: message.into(),
            source_name: source_name.into(),
        }
    }

    /// Create an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        ReelError::Encoding(message.into())
    }

    /// The failure category surfaced to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReelError::AssetLoad { .. } => ErrorKind::AssetLoad,
            ReelError::SurfaceUnavailable(_) => ErrorKind::SurfaceUnavailable,
            ReelError::SurfaceBusy => ErrorKind::SurfaceBusy,
            ReelError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ReelError::Encoding(_) => ErrorKind::Encoding,
            ReelError::Config(_) => ErrorKind::Config,
            ReelError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ReelError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Error categories, stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    AssetLoad,
    SurfaceUnavailable,
    SurfaceBusy,
    UnsupportedFormat,
    Encoding,
    Config,
    InvalidArgument,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::AssetLoad => "AssetLoadError",
            ErrorKind::SurfaceUnavailable => "SurfaceUnavailableError",
            ErrorKind::SurfaceBusy => "SurfaceBusyError",
            ErrorKind::UnsupportedFormat => "UnsupportedFormatError",
            ErrorKind::Encoding => "EncodingError",
            ErrorKind::Config => "ConfigError",
            ErrorKind::InvalidArgument => "InvalidArgumentError",
            ErrorKind::Io => "IoError",
        };
        f.write_str(name)
    }
}
