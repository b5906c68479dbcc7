//! Windowing error types
//!
//! Native failures are reported by the windowing library through its global
//! error callback. The backend records them and the platform layer turns the
//! recorded code and description into a typed [`WindowError`].

use thiserror::Error;

/// Error kinds reported by the native windowing library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// The library has not been initialized
    NotInitialized = 0x0001_0001,
    /// No context is current on the calling thread
    NoCurrentContext = 0x0001_0002,
    /// An enum argument was not valid for the requested function
    InvalidEnum = 0x0001_0003,
    /// A value argument was out of range or otherwise invalid
    InvalidValue = 0x0001_0004,
    /// A memory allocation failed
    OutOfMemory = 0x0001_0005,
    /// The requested client API is not supported by the system
    ApiUnavailable = 0x0001_0006,
    /// The requested client API version is not available
    VersionUnavailable = 0x0001_0007,
    /// A platform-specific error occurred
    PlatformError = 0x0001_0008,
    /// The requested pixel format or clipboard format is not supported
    FormatUnavailable = 0x0001_0009,
    /// The window passed to a context function has no context
    NoWindowContext = 0x0001_000A,
    /// Any code this crate does not know about
    Unknown = -1,
}

impl ErrorCode {
    /// Translate a raw native error code
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0x0001_0001 => Self::NotInitialized,
            0x0001_0002 => Self::NoCurrentContext,
            0x0001_0003 => Self::InvalidEnum,
            0x0001_0004 => Self::InvalidValue,
            0x0001_0005 => Self::OutOfMemory,
            0x0001_0006 => Self::ApiUnavailable,
            0x0001_0007 => Self::VersionUnavailable,
            0x0001_0008 => Self::PlatformError,
            0x0001_0009 => Self::FormatUnavailable,
            0x0001_000A => Self::NoWindowContext,
            _ => Self::Unknown,
        }
    }

    /// Raw native value of this code
    pub const fn raw(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotInitialized => "not initialized",
            Self::NoCurrentContext => "no current context",
            Self::InvalidEnum => "invalid enum",
            Self::InvalidValue => "invalid value",
            Self::OutOfMemory => "out of memory",
            Self::ApiUnavailable => "API unavailable",
            Self::VersionUnavailable => "version unavailable",
            Self::PlatformError => "platform error",
            Self::FormatUnavailable => "format unavailable",
            Self::NoWindowContext => "no window context",
            Self::Unknown => "unknown error",
        };
        f.write_str(name)
    }
}

/// A failure recorded by the native error callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeFailure {
    /// Error kind
    pub code: ErrorCode,
    /// Human readable description supplied by the library
    pub description: String,
}

impl NativeFailure {
    /// Create a failure record
    pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

/// Window management errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The native library refused to initialize
    #[error("Windowing library initialization failed: {0}")]
    InitializationFailed(String),

    /// The native library was used from a thread other than the one that initialized it
    #[error("Windowing library must only be used from the thread that initialized it")]
    WrongThread,

    /// A native resource could not be created
    #[error("Failed to create {resource}: {description} ({code})")]
    CreationFailed {
        /// Kind of resource that was being created
        resource: &'static str,
        /// Native error kind
        code: ErrorCode,
        /// Native error description
        description: String,
    },

    /// A native call reported an error
    #[error("Windowing error ({code}): {description}")]
    Native {
        /// Native error kind
        code: ErrorCode,
        /// Native error description
        description: String,
    },

    /// An argument was rejected before reaching the native library
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The wrapper no longer owns a native handle
    #[error("Operation on an empty {0} handle")]
    EmptyHandle(&'static str),
}

impl WindowError {
    /// Native error kind, if this error came from the native library
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::CreationFailed { code, .. } | Self::Native { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<NativeFailure> for WindowError {
    fn from(failure: NativeFailure) -> Self {
        Self::Native {
            code: failure.code,
            description: failure.description,
        }
    }
}

/// Result alias for windowing operations
pub type WindowResult<T> = Result<T, WindowError>;
