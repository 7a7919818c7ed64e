//! Error types for the furshell library

use thiserror::Error;

/// Main error type for the library
///
/// No failure is recovered locally: every error aborts the in-progress
/// construction and surfaces to the caller. Partially built GPU state is
/// dropped on the error path, so a failed constructor never leaves a
/// live resource behind.
#[derive(Debug, Error)]
pub enum Error {
    /// A shader stage failed to parse or validate. Carries the full
    /// diagnostic log.
    #[error("shader compile error: {0}")]
    ShaderCompile(String),

    /// Program linking failed (missing stage, stage kind mismatch, or a
    /// vertex/fragment interface mismatch). Carries the diagnostic log.
    #[error("shader link error: {0}")]
    ShaderLink(String),

    /// The image byte stream had a bad signature or an unsupported
    /// color model.
    #[error("image format error: {0}")]
    ImageFormat(String),

    /// A pixel lookup outside the decoded image dimensions.
    #[error("pixel ({col}, {row}) out of bounds for {width}x{height} image")]
    OutOfBounds {
        col: u32,
        row: u32,
        width: u32,
        height: u32,
    },

    /// The decoded image has fewer than 3 channels and cannot report RGB.
    #[error("image cannot be sampled: {0}")]
    Unsampleable(String),

    /// A bad input parameter, rejected before any allocation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
