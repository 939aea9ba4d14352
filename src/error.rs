//! Error types and error code constants for litfmt.
//!
//! This module provides a unified error type (`LitfmtError`) covering every
//! failure the tool can report, plus a stable exit-code mapping for the CLI.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller)
//! - `3`: Input errors (source file missing, unreadable, or unparseable)
//! - `4`: Format errors (the external formatter failed on a region)
//! - `5`: Write errors (output could not be written)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes for process exit status and JSON error envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Input errors (source file missing, unreadable, not valid syntax).
    InputError = 3,
    /// Format errors (external formatter rejected or failed on a region).
    FormatError = 4,
    /// Write errors (output could not be written).
    WriteError = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Stable string name for JSON output.
    pub fn name(&self) -> &'static str {
        match self {
            OutputErrorCode::InvalidArguments => "InvalidArguments",
            OutputErrorCode::InputError => "InputError",
            OutputErrorCode::FormatError => "FormatError",
            OutputErrorCode::WriteError => "WriteError",
            OutputErrorCode::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the litfmt pipeline and CLI.
///
/// Each variant carries enough context to produce a helpful message: format
/// failures identify the region by index and byte offsets so the caller can
/// find the offending literal.
#[derive(Debug, Error)]
pub enum LitfmtError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Source file missing or unreadable.
    #[error("input file not found: {path}")]
    InputNotFound { path: String },

    /// Source file is not valid UTF-8.
    #[error("input is not valid UTF-8: {path}")]
    InvalidUtf8 { path: String },

    /// Source is not valid syntax for the parser.
    #[error("parse error in {path} at {line}:{col}")]
    ParseError { path: String, line: u32, col: u32 },

    /// The external formatter failed on one region.
    #[error("formatter failed on region {index} [{start}, {end}): {message}")]
    FormatError {
        index: usize,
        start: usize,
        end: usize,
        message: String,
    },

    /// Output could not be written.
    #[error("cannot write {path}: {message}")]
    WriteError { path: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&LitfmtError> for OutputErrorCode {
    fn from(err: &LitfmtError) -> Self {
        match err {
            LitfmtError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            LitfmtError::InputNotFound { .. } => OutputErrorCode::InputError,
            LitfmtError::InvalidUtf8 { .. } => OutputErrorCode::InputError,
            LitfmtError::ParseError { .. } => OutputErrorCode::InputError,
            LitfmtError::FormatError { .. } => OutputErrorCode::FormatError,
            LitfmtError::WriteError { .. } => OutputErrorCode::WriteError,
            LitfmtError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<LitfmtError> for OutputErrorCode {
    fn from(err: LitfmtError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl LitfmtError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        LitfmtError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an input not found error.
    pub fn input_not_found(path: impl Into<String>) -> Self {
        LitfmtError::InputNotFound { path: path.into() }
    }

    /// Create a write error.
    pub fn write_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        LitfmtError::WriteError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        LitfmtError::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
